use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::data::access::{AccessClient, AccessError, MAX_HEIGHT_RANGE, RawEvent};
use crate::data::types::{EventTypeId, SubscriptionId};

/// What a subscription reports to its handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Cursor established; events from `start_height` onward will follow.
    Started { start_height: u64 },
    Event(RawEvent),
    /// The transport failed and the subscription has ended.
    Failed(String),
}

/// Opens polling subscriptions against an access node.
///
/// Delivery order is whatever order the access node returns events in: ascending
/// block height, then event order inside each block. Nothing is re-sorted here.
pub struct EventSubscriber {
    client: Arc<AccessClient>,
    poll_interval: Duration,
}

impl EventSubscriber {
    pub fn new(client: Arc<AccessClient>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    /// Start delivering events of `event_type` to `handler`, one call per notification,
    /// each tagged with the id of the returned subscription.
    ///
    /// Without `start_height` the cursor starts at the latest sealed block, so only
    /// events sealed after this call are delivered.
    pub fn subscribe<F>(
        &self,
        event_type: EventTypeId,
        start_height: Option<u64>,
        handler: F,
    ) -> Subscription
    where
        F: FnMut(SubscriptionId, Notification) + Send + 'static,
    {
        let id = SubscriptionId::next();
        let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel::<()>();
        let cancelled = Arc::new(Mutex::new(false));

        let client = Arc::clone(&self.client);
        let poll_interval = self.poll_interval;
        let flag = Arc::clone(&cancelled);

        tracing::info!(subscription = %id, %event_type, "subscribing");

        tokio::spawn(async move {
            let mut deliver = Guarded { id, flag, handler };
            let outcome = tokio::select! {
                result = poll_loop(&client, &event_type, start_height, poll_interval, &mut deliver) => Some(result),
                _ = shutdown_rx.recv() => None,
            };
            if let Some(Err(e)) = outcome {
                tracing::warn!(subscription = %id, %event_type, error = %e, "subscription failed");
                deliver.send(Notification::Failed(e.to_string()));
            }
            tracing::info!(subscription = %id, "subscription task finished");
        });

        Subscription {
            id,
            shutdown_tx: Some(shutdown_tx),
            cancelled,
        }
    }
}

/// Handler wrapper that stays silent once the subscription is cancelled.
///
/// The cancel lock is held for the whole handler call, so `unsubscribe` waits
/// for a call in progress and no call starts after it.
struct Guarded<F> {
    id: SubscriptionId,
    flag: Arc<Mutex<bool>>,
    handler: F,
}

impl<F: FnMut(SubscriptionId, Notification)> Guarded<F> {
    fn send(&mut self, notification: Notification) {
        let Ok(cancelled) = self.flag.lock() else {
            return;
        };
        if !*cancelled {
            (self.handler)(self.id, notification);
        }
    }
}

async fn poll_loop<F: FnMut(SubscriptionId, Notification)>(
    client: &AccessClient,
    event_type: &EventTypeId,
    start_height: Option<u64>,
    poll_interval: Duration,
    deliver: &mut Guarded<F>,
) -> Result<(), AccessError> {
    // `next` is the first height not yet scanned.
    let mut next = match start_height {
        Some(h) => h,
        None => client.latest_sealed_height().await? + 1,
    };
    deliver.send(Notification::Started { start_height: next });

    let mut interval = tokio::time::interval(poll_interval);
    loop {
        interval.tick().await;

        let sealed = client.latest_sealed_height().await?;
        while next <= sealed {
            let end = sealed.min(next + MAX_HEIGHT_RANGE - 1);
            tracing::debug!(%event_type, start = next, end, "polling events");
            for event in client.events_in_range(event_type, next, end).await? {
                deliver.send(Notification::Event(event));
            }
            next = end + 1;
        }
    }
}

/// Handle to a running subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: SubscriptionId,
    shutdown_tx: Option<mpsc::UnboundedSender<()>>,
    cancelled: Arc<Mutex<bool>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Stop delivery. The handler is not called again once this returns; calling it twice is a no-op.
    pub fn unsubscribe(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            if let Ok(mut cancelled) = self.cancelled.lock() {
                *cancelled = true;
            }
            let _ = tx.send(());
            tracing::info!(subscription = %self.id, "unsubscribed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn fainted_payload(card_id: u64) -> String {
        let doc = json!({
            "type": "Event",
            "value": {
                "id": "A.01.AutoGame.CardFainted",
                "fields": [
                    { "name": "battleID", "value": { "type": "UInt64", "value": "9" } },
                    { "name": "cardID", "value": { "type": "UInt64", "value": card_id.to_string() } }
                ]
            }
        });
        STANDARD.encode(doc.to_string())
    }

    async fn server_with_events() -> mockito::ServerGuard {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/blocks")
            .match_query(Matcher::UrlEncoded("height".into(), "sealed".into()))
            .with_status(200)
            .with_body(json!([{ "header": { "height": "12" } }]).to_string())
            .create();
        server
            .mock("GET", "/v1/events")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start_height".into(), "10".into()),
                Matcher::UrlEncoded("end_height".into(), "12".into()),
            ]))
            .with_status(200)
            .with_body(
                json!([
                    { "block_height": "10", "block_timestamp": "", "events": [
                        { "type": "A.01.AutoGame.CardFainted", "transaction_id": "t1", "event_index": "0", "payload": fainted_payload(1) }
                    ] },
                    { "block_height": "12", "block_timestamp": "", "events": [
                        { "type": "A.01.AutoGame.CardFainted", "transaction_id": "t2", "event_index": "0", "payload": fainted_payload(2) },
                        { "type": "A.01.AutoGame.CardFainted", "transaction_id": "t2", "event_index": "1", "payload": fainted_payload(3) }
                    ] }
                ])
                .to_string(),
            )
            .create();
        server
    }

    #[tokio::test]
    async fn test_delivers_in_node_order_after_started() {
        let server = server_with_events().await;
        let client = Arc::new(AccessClient::connect(&server.url()).await.unwrap());
        let subscriber = EventSubscriber::new(client, Duration::from_millis(10));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut subscription = subscriber.subscribe(
            EventTypeId::new("01", "AutoGame", "CardFainted"),
            Some(10),
            move |_, n| {
                let _ = tx.send(n);
            },
        );

        assert_eq!(
            rx.recv().await.unwrap(),
            Notification::Started { start_height: 10 }
        );
        let mut cards = Vec::new();
        for _ in 0..3 {
            match rx.recv().await.unwrap() {
                Notification::Event(e) => cards.push(e.data["cardID"].as_u64().unwrap()),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(cards, vec![1, 2, 3]);

        subscription.unsubscribe();
        assert!(subscription.shutdown_tx.is_none());
    }

    #[tokio::test]
    async fn test_no_notifications_after_unsubscribe() {
        let server = server_with_events().await;
        let client = Arc::new(AccessClient::connect(&server.url()).await.unwrap());
        let subscriber = EventSubscriber::new(client, Duration::from_millis(10));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut subscription = subscriber.subscribe(
            EventTypeId::new("01", "AutoGame", "CardFainted"),
            Some(10),
            move |_, n| {
                let _ = tx.send(n);
            },
        );
        subscription.unsubscribe();
        subscription.unsubscribe();

        // The task drops its handler (and so the sender) when it exits.
        let mut delivered = 0;
        while let Some(_n) = rx.recv().await {
            delivered += 1;
        }
        assert_eq!(delivered, 0);
    }

    #[test]
    fn test_guarded_handler_silent_after_cancel() {
        let flag = Arc::new(Mutex::new(false));
        let mut seen = Vec::new();
        {
            let mut deliver = Guarded {
                id: SubscriptionId::next(),
                flag: Arc::clone(&flag),
                handler: |_: SubscriptionId, n: Notification| seen.push(n),
            };
            deliver.send(Notification::Started { start_height: 1 });
            *flag.lock().unwrap() = true;
            deliver.send(Notification::Started { start_height: 2 });
        }
        assert_eq!(seen, vec![Notification::Started { start_height: 1 }]);
    }

    #[tokio::test]
    async fn test_large_backlog_is_split_into_ranges() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/blocks")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!([{ "header": { "height": "600" } }]).to_string())
            .create();

        let mut ranges = Vec::new();
        for (card_id, (start, end)) in [(1u64, (1u64, 250u64)), (2, (251, 500)), (3, (501, 600))] {
            let mock = server
                .mock("GET", "/v1/events")
                .match_query(Matcher::AllOf(vec![
                    Matcher::UrlEncoded("start_height".into(), start.to_string()),
                    Matcher::UrlEncoded("end_height".into(), end.to_string()),
                ]))
                .with_status(200)
                .with_body(
                    json!([
                        { "block_height": end.to_string(), "block_timestamp": "", "events": [
                            { "type": "A.01.AutoGame.CardFainted", "transaction_id": "t", "event_index": "0", "payload": fainted_payload(card_id) }
                        ] }
                    ])
                    .to_string(),
                )
                .expect(1)
                .create();
            ranges.push(mock);
        }

        let client = Arc::new(AccessClient::connect(&server.url()).await.unwrap());
        let subscriber = EventSubscriber::new(client, Duration::from_millis(10));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut subscription = subscriber.subscribe(
            EventTypeId::new("01", "AutoGame", "CardFainted"),
            Some(1),
            move |_, n| {
                let _ = tx.send(n);
            },
        );

        assert_eq!(
            rx.recv().await.unwrap(),
            Notification::Started { start_height: 1 }
        );
        let mut delivered = Vec::new();
        for _ in 0..3 {
            match rx.recv().await.unwrap() {
                Notification::Event(e) => {
                    delivered.push((e.block_height, e.data["cardID"].as_u64().unwrap()))
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(delivered, vec![(250, 1), (500, 2), (600, 3)]);

        subscription.unsubscribe();
        for mock in &ranges {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_transport_failure_ends_subscription() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/blocks")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!([{ "header": { "height": "3" } }]).to_string())
            .create();
        server
            .mock("GET", "/v1/events")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"code":500,"message":"storage unavailable"}"#)
            .create();

        let client = Arc::new(AccessClient::connect(&server.url()).await.unwrap());
        let subscriber = EventSubscriber::new(client, Duration::from_millis(10));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = subscriber.subscribe(
            EventTypeId::new("01", "AutoGame", "BattleEnded"),
            Some(1),
            move |_, n| {
                let _ = tx.send(n);
            },
        );

        assert!(matches!(rx.recv().await, Some(Notification::Started { .. })));
        match rx.recv().await {
            Some(Notification::Failed(msg)) => assert!(msg.contains("storage unavailable")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }
}
