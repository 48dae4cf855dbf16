//! JSON-Cadence decoding.
//!
//! Access nodes return event payloads as base64 encoded JSON-Cadence documents:
//! every value is wrapped as `{"type": <T>, "value": <V>}`. These helpers unwrap
//! that envelope into plain JSON so payloads can be deserialized into typed events.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CadenceError {
    #[error("Payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed Cadence value: {0}")]
    Malformed(String),
}

/// Decode a base64 event payload into its event id and a JSON object of its fields.
pub fn decode_event_payload(payload: &str) -> Result<(String, Value), CadenceError> {
    let bytes = STANDARD.decode(payload.trim())?;
    let document: Value = serde_json::from_slice(&bytes)?;

    let value = document
        .get("value")
        .ok_or_else(|| CadenceError::Malformed("event payload has no value".to_string()))?;
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok((id, decode_value(&document)?))
}

/// Unwrap one JSON-Cadence value.
pub fn decode_value(value: &Value) -> Result<Value, CadenceError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| CadenceError::Malformed(format!("missing type in {value}")))?;
    let inner = value.get("value").unwrap_or(&Value::Null);

    match kind {
        "Void" => Ok(Value::Null),
        "Optional" => {
            if inner.is_null() {
                Ok(Value::Null)
            } else {
                decode_value(inner)
            }
        }
        "Bool" | "String" | "Character" | "Address" => Ok(inner.clone()),
        "Int" | "Int8" | "Int16" | "Int32" | "Int64" | "Int128" | "Int256" | "UInt"
        | "UInt8" | "UInt16" | "UInt32" | "UInt64" | "UInt128" | "UInt256" | "Word8"
        | "Word16" | "Word32" | "Word64" | "Word128" | "Word256" => Ok(decode_integer(inner)),
        "Fix64" | "UFix64" => Ok(inner.clone()),
        "Array" => {
            let items = inner
                .as_array()
                .ok_or_else(|| CadenceError::Malformed("array value is not a list".to_string()))?;
            items
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "Dictionary" => {
            let entries = inner.as_array().ok_or_else(|| {
                CadenceError::Malformed("dictionary value is not a list".to_string())
            })?;
            let mut map = Map::new();
            for entry in entries {
                let key = entry
                    .get("key")
                    .ok_or_else(|| CadenceError::Malformed("dictionary entry without key".to_string()))
                    .and_then(decode_value)?;
                let val = entry
                    .get("value")
                    .ok_or_else(|| CadenceError::Malformed("dictionary entry without value".to_string()))
                    .and_then(decode_value)?;
                let key = match key {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                map.insert(key, val);
            }
            Ok(Value::Object(map))
        }
        "Struct" | "Resource" | "Event" | "Contract" | "Enum" => decode_composite(inner),
        "Path" => {
            let domain = inner.get("domain").and_then(Value::as_str).unwrap_or_default();
            let identifier = inner
                .get("identifier")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Ok(Value::String(format!("/{domain}/{identifier}")))
        }
        "Type" => Ok(inner
            .get("staticType")
            .map(static_type_name)
            .unwrap_or(Value::Null)),
        _ => Ok(inner.clone()),
    }
}

fn decode_composite(inner: &Value) -> Result<Value, CadenceError> {
    let fields = inner
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| CadenceError::Malformed("composite without fields".to_string()))?;

    let mut map = Map::new();
    for field in fields {
        let name = field
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| CadenceError::Malformed("composite field without name".to_string()))?;
        let value = field
            .get("value")
            .ok_or_else(|| CadenceError::Malformed(format!("field {name} without value")))?;
        map.insert(name.to_string(), decode_value(value)?);
    }
    Ok(Value::Object(map))
}

/// Integers arrive as decimal strings; keep them as strings when they overflow 64 bits.
fn decode_integer(inner: &Value) -> Value {
    let Some(s) = inner.as_str() else {
        return inner.clone();
    };
    if let Ok(n) = s.parse::<u64>() {
        return Value::Number(Number::from(n));
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(Number::from(n));
    }
    Value::String(s.to_string())
}

fn static_type_name(static_type: &Value) -> Value {
    match static_type {
        Value::String(s) => Value::String(s.clone()),
        other => other
            .get("typeID")
            .cloned()
            .unwrap_or_else(|| other.get("kind").cloned().unwrap_or(Value::Null)),
    }
}
