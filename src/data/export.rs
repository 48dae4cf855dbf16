use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::data::types::{EventTypeId, FlowEvent};
use crate::render;

/// File stem for an export of `stream` taken at `at`, e.g. "BattleCreated-20250106-100000".
pub fn export_stem(stream: &EventTypeId, at: DateTime<Utc>) -> String {
    format!("{}-{}", stream.event_name(), at.format("%Y%m%d-%H%M%S"))
}

/// Export events with their full payloads to JSON, newest first.
pub fn export_events_json(
    stream: &EventTypeId,
    events: &[FlowEvent],
    path: &Path,
) -> Result<String, String> {
    let json = serde_json::json!({
        "stream": stream,
        "exported_at": Utc::now().to_rfc3339(),
        "count": events.len(),
        "events": events,
    });

    let formatted = serde_json::to_string_pretty(&json)
        .map_err(|e| format!("Failed to serialize JSON: {e}"))?;

    let mut file = fs::File::create(path).map_err(|e| format!("Failed to create file: {e}"))?;
    file.write_all(formatted.as_bytes())
        .map_err(|e| format!("Failed to write file: {e}"))?;

    Ok(format!("Exported {} events to {}", events.len(), path.display()))
}

/// Export one summary row per event to CSV.
///
/// Columns: block_height, block_timestamp, transaction_id, event_index, event_type, summary
pub fn export_events_csv(events: &[FlowEvent], path: &Path) -> Result<String, String> {
    let file = fs::File::create(path).map_err(|e| format!("Failed to create file: {e}"))?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "block_height",
        "block_timestamp",
        "transaction_id",
        "event_index",
        "event_type",
        "summary",
    ])
    .map_err(|e| format!("Failed to write CSV header: {e}"))?;

    for event in events {
        let summary = render::event_card(&event.event)
            .map(|card| card.text().replace('\n', "; "))
            .unwrap_or_default();
        wtr.write_record(&[
            event.block_height.to_string(),
            event.block_timestamp.clone(),
            event.transaction_id.clone(),
            event.event_index.to_string(),
            event.event_type.clone(),
            summary,
        ])
        .map_err(|e| format!("Failed to write CSV row: {e}"))?;
    }

    wtr.flush().map_err(|e| format!("Failed to flush CSV: {e}"))?;

    Ok(format!("Exported {} events to {}", events.len(), path.display()))
}
