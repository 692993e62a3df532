//! Wire decoding
//!
//! The backend has emitted several shapes over time:
//! - readings keyed by `DeviceId` or by `Device`
//! - status batches under `Meters` (with an `Online` flag) or under
//!   `ConfiguredMeters` (with `Id` and a ready-made `Status`)
//! - the long-poll firehose wrapping any of the above in
//!   `{"events": [{"timestamp", "category", "data"}]}`
//!
//! All of that is resolved here into [`Payload`] so the merge logic never
//! has to look at field names.

use crate::error::Result;
use crate::reading::DeviceId;
use crate::status::StatusRecord;
use serde::Deserialize;
use serde_json::Value;

/// A single reading as sent by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingEvent {
    pub device: DeviceId,
    /// IEC 61850 quantity code
    pub code: String,
    /// Raw value, normalized later by the merger
    pub value: Value,
    /// Unix milliseconds, if the event carried a timestamp
    pub timestamp: Option<i64>,
}

/// Which historical status batch shape a batch came in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusShape {
    /// `{"Meters": [{"Device", "Online", ...}]}`
    Meters,
    /// `{"ConfiguredMeters": [{"Id", "Type", "Status"}]}`
    ConfiguredMeters,
}

/// Decoded payload, one variant per meaning
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Reading(ReadingEvent),
    StatusBatch {
        shape: StatusShape,
        records: Vec<StatusRecord>,
    },
    Unrecognized,
}

/// A payload together with the time the event log stamped it, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub payload: Payload,
    pub logged_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct FirehoseEvent {
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    data: Value,
}

/// Events of a firehose envelope that decode; malformed elements are skipped
fn firehose_events(value: &Value) -> Vec<FirehoseEvent> {
    value
        .get("events")
        .and_then(Value::as_array)
        .map(|events| {
            events
                .iter()
                .filter_map(|ev| FirehoseEvent::deserialize(ev).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Decode a text frame. Malformed JSON is an error; unknown shapes are not.
pub fn decode_frame(text: &str) -> Result<Vec<Inbound>> {
    let value: Value = serde_json::from_str(text)?;
    Ok(decode_value(&value))
}

/// Decode an already parsed frame into the payloads it carries, in order
pub fn decode_value(value: &Value) -> Vec<Inbound> {
    if is_firehose(value) {
        return firehose_events(value)
            .into_iter()
            .map(|ev| Inbound {
                payload: decode_payload(&ev.data),
                logged_at: ev.timestamp,
            })
            .collect();
    }
    vec![Inbound {
        payload: decode_payload(value),
        logged_at: None,
    }]
}

/// Firehose cursor to resume from: the newest event timestamp, else the
/// timestamp the backend reported with a timeout response.
pub fn firehose_cursor(value: &Value) -> Option<i64> {
    if !is_firehose(value) {
        return None;
    }
    let newest = firehose_events(value)
        .iter()
        .filter_map(|ev| ev.timestamp)
        .max();
    newest.or_else(|| value.get("timestamp").and_then(Value::as_i64))
}

fn is_firehose(value: &Value) -> bool {
    value.get("events").is_some_and(Value::is_array) || value.get("timeout").is_some()
}

/// Decode one payload object
pub fn decode_payload(value: &Value) -> Payload {
    if let Some(records) = non_empty_list(value, "Meters") {
        return Payload::StatusBatch {
            shape: StatusShape::Meters,
            records: records
                .iter()
                .filter_map(|r| status_record(r, "Device", true))
                .collect(),
        };
    }
    if let Some(records) = non_empty_list(value, "ConfiguredMeters") {
        return Payload::StatusBatch {
            shape: StatusShape::ConfiguredMeters,
            records: records
                .iter()
                .filter_map(|r| status_record(r, "Id", false))
                .collect(),
        };
    }

    let device = value
        .get("DeviceId")
        .and_then(device_id)
        .or_else(|| value.get("Device").and_then(device_id));
    let code = value
        .get("IEC61850")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty());

    match (device, code) {
        (Some(device), Some(code)) => Payload::Reading(ReadingEvent {
            device,
            code: code.to_string(),
            value: value.get("Value").cloned().unwrap_or(Value::Null),
            timestamp: value.get("Timestamp").and_then(unix_millis),
        }),
        _ => Payload::Unrecognized,
    }
}

fn non_empty_list<'a>(value: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    value
        .get(key)
        .and_then(Value::as_array)
        .filter(|list| !list.is_empty())
}

fn status_record(value: &Value, id_key: &str, has_online: bool) -> Option<StatusRecord> {
    let fields = value.as_object()?;
    let device = fields.get(id_key).and_then(device_id)?;
    // a Meters record without a usable flag counts as offline
    let online = if has_online {
        Some(fields.get("Online").and_then(Value::as_bool).unwrap_or(false))
    } else {
        None
    };
    Some(StatusRecord {
        device,
        fields: fields.clone(),
        online,
    })
}

/// Normalize a wire device id; numbers and strings are both accepted
pub fn device_id(value: &Value) -> Option<DeviceId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn unix_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}
