use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::data::cadence;
use crate::data::types::EventTypeId;

/// Largest height range the access node accepts in one events query.
pub const MAX_HEIGHT_RANGE: u64 = 250;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Access node error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Response(String),
}

impl From<reqwest::Error> for AccessError {
    fn from(err: reqwest::Error) -> Self {
        AccessError::Network(err.to_string())
    }
}

/// An event as returned by the access node, payload already unwrapped from JSON-Cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub event_type: String,
    pub block_height: u64,
    pub block_timestamp: String,
    pub transaction_id: String,
    pub event_index: u32,
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct BlockResponse {
    header: BlockHeader,
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    height: String,
}

#[derive(Debug, Deserialize)]
struct BlockEvents {
    block_height: String,
    #[serde(default)]
    block_timestamp: String,
    #[serde(default)]
    events: Vec<EventEnvelope>,
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    transaction_id: String,
    event_index: String,
    payload: String,
}

/// REST client for a Flow access node.
pub struct AccessClient {
    http: reqwest::Client,
    base_url: String,
    sealed_height: u64,
}

impl AccessClient {
    /// Connect to an access node and confirm it answers with a sealed block.
    pub async fn connect(base_url: &str) -> Result<Self, AccessError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let mut client = Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            sealed_height: 0,
        };
        client.sealed_height = client.latest_sealed_height().await?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sealed height observed at connection time.
    pub fn initial_sealed_height(&self) -> u64 {
        self.sealed_height
    }

    /// Height of the latest sealed block.
    pub async fn latest_sealed_height(&self) -> Result<u64, AccessError> {
        let url = format!("{}/v1/blocks", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("height", "sealed")])
            .send()
            .await?;
        let blocks: Vec<BlockResponse> = Self::json(response).await?;

        let block = blocks
            .first()
            .ok_or_else(|| AccessError::Response("no sealed block returned".to_string()))?;
        parse_height(&block.header.height)
    }

    /// Events of `event_type` emitted in `start..=end`, in the order the node returns them.
    pub async fn events_in_range(
        &self,
        event_type: &EventTypeId,
        start: u64,
        end: u64,
    ) -> Result<Vec<RawEvent>, AccessError> {
        let url = format!("{}/v1/events", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("type", event_type.as_str().to_string()),
                ("start_height", start.to_string()),
                ("end_height", end.to_string()),
            ])
            .send()
            .await?;
        let blocks: Vec<BlockEvents> = Self::json(response).await?;

        let mut events = Vec::new();
        for block in blocks {
            let block_height = parse_height(&block.block_height)?;
            for envelope in block.events {
                // A payload that does not decode is still delivered, with null data.
                let data = match cadence::decode_event_payload(&envelope.payload) {
                    Ok((_, data)) => data,
                    Err(e) => {
                        tracing::warn!(
                            event_type = %envelope.event_type,
                            transaction_id = %envelope.transaction_id,
                            error = %e,
                            "undecodable event payload"
                        );
                        serde_json::Value::Null
                    }
                };
                let event_index = envelope.event_index.parse().map_err(|_| {
                    AccessError::Response(format!("bad event index '{}'", envelope.event_index))
                })?;
                events.push(RawEvent {
                    event_type: envelope.event_type,
                    block_height,
                    block_timestamp: block.block_timestamp.clone(),
                    transaction_id: envelope.transaction_id,
                    event_index,
                    data,
                });
            }
        }
        Ok(events)
    }

    async fn json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AccessError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AccessError::Api {
                status: status.as_u16(),
                message: extract_message(&message),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AccessError::Response(e.to_string()))
    }
}

fn parse_height(s: &str) -> Result<u64, AccessError> {
    s.parse()
        .map_err(|_| AccessError::Response(format!("bad block height '{s}'")))
}

/// Access node errors come as `{"code": 400, "message": "..."}`.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
