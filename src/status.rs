//! Per-device status tracking
//!
//! Status records arrive in batches, separately from readings. They merge
//! with the same last-known-value rule: a record overwrites the fields it
//! carries and leaves every other field alone.

use crate::reading::DeviceId;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field holding the display status string
pub const STATUS_FIELD: &str = "Status";

/// Display status for an online flag
pub fn status_label(online: bool) -> &'static str {
    if online { "online" } else { "offline" }
}

/// One device's entry of a status batch, already decoded
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    /// Device the record belongs to
    pub device: DeviceId,
    /// All fields of the record as received, id field included
    pub fields: Map<String, Value>,
    /// Online flag, when the record shape carries one
    pub online: Option<bool>,
}

/// Last known status fields of one device
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DeviceStatusState {
    fields: BTreeMap<String, Value>,
}

impl DeviceStatusState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a record; `null` fields are ignored, the display status is
    /// derived from the online flag here rather than at display time.
    pub fn merge(&mut self, record: &StatusRecord) {
        for (key, value) in &record.fields {
            if !value.is_null() {
                self.fields.insert(key.clone(), value.clone());
            }
        }
        if let Some(online) = record.online {
            self.fields.insert(
                STATUS_FIELD.to_string(),
                Value::String(status_label(online).to_string()),
            );
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Display status string, if known
    pub fn status(&self) -> Option<&str> {
        self.fields.get(STATUS_FIELD).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Status states of every device seen this session, ordered by id
pub type StatusTable = BTreeMap<DeviceId, DeviceStatusState>;

/// Fetch-or-create the device's status and merge the record into it
pub fn merge_status(table: &mut StatusTable, record: &StatusRecord) {
    table.entry(record.device.clone()).or_default().merge(record);
}
