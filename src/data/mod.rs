pub mod access;
pub mod cadence;
pub mod catalog;
pub mod event_log;
pub mod export;
pub mod manifest;
pub mod subscription;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::data::access::{AccessClient, RawEvent};
use crate::data::catalog::EventCatalog;
use crate::data::subscription::{EventSubscriber, Notification, Subscription};
use crate::data::types::*;
use crate::events::AppEvent;

pub struct EventService {
    client: Arc<AccessClient>,
    catalog: Arc<EventCatalog>,
    subscriber: EventSubscriber,
    start_height: Option<u64>,
    export_dir: PathBuf,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventService {
    pub fn new(
        client: AccessClient,
        catalog: EventCatalog,
        poll_interval: Duration,
        start_height: Option<u64>,
        export_dir: PathBuf,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let client = Arc::new(client);
        Self {
            subscriber: EventSubscriber::new(Arc::clone(&client), poll_interval),
            client,
            catalog: Arc::new(catalog),
            start_height,
            export_dir,
            event_tx,
        }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Fetch the latest sealed height and send it as an event.
    pub fn fetch_sealed_height(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match client.latest_sealed_height().await {
                Ok(height) => {
                    let _ = tx.send(AppEvent::SealedHeight(height));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::Error(format!("Failed to get sealed height: {e}")));
                }
            }
        });
    }

    /// Open a fresh subscription to `stream`; notifications arrive as app events tagged with its id.
    pub fn subscribe(&self, stream: EventTypeId) -> Subscription {
        let tx = self.event_tx.clone();
        let catalog = Arc::clone(&self.catalog);

        self.subscriber
            .subscribe(stream, self.start_height, move |subscription, notification| {
                let event = match notification {
                    Notification::Started { start_height } => AppEvent::SubscriptionStarted {
                        subscription,
                        start_height,
                    },
                    Notification::Event(raw) => AppEvent::Flow {
                        subscription,
                        event: Box::new(to_flow_event(&catalog, raw)),
                    },
                    Notification::Failed(message) => AppEvent::SubscriptionFailed {
                        subscription,
                        message,
                    },
                };
                let _ = tx.send(event);
            })
    }

    /// Write the given events to JSON and CSV files in the export directory.
    pub fn export(&self, stream: EventTypeId, events: Vec<FlowEvent>) {
        let dir = self.export_dir.clone();
        let tx = self.event_tx.clone();

        tokio::task::spawn_blocking(move || {
            let stem = export::export_stem(&stream, Utc::now());
            let json_path = dir.join(format!("{stem}.json"));
            let csv_path = dir.join(format!("{stem}.csv"));

            let result = export::export_events_json(&stream, &events, &json_path)
                .and_then(|msg| export::export_events_csv(&events, &csv_path).map(|_| msg));

            match result {
                Ok(msg) => {
                    tracing::info!(path = %json_path.display(), count = events.len(), "exported events");
                    let _ = tx.send(AppEvent::ExportComplete(msg));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "export failed");
                    let _ = tx.send(AppEvent::Error(e));
                }
            }
        });
    }
}

fn to_flow_event(catalog: &EventCatalog, raw: RawEvent) -> FlowEvent {
    let kind = catalog.kind_of(&raw.event_type);
    let event = GameEvent::from_payload(kind, &raw.event_type, raw.data);
    FlowEvent {
        event_type: raw.event_type,
        block_height: raw.block_height,
        block_timestamp: raw.block_timestamp,
        transaction_id: raw.transaction_id,
        event_index: raw.event_index,
        event,
    }
}
