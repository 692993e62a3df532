//! Per-device reading state and the last-known-value merge
//!
//! A device's state maps quantity codes to the last value received for
//! them. Slots are only ever inserted or overwritten; an absent slot means
//! the quantity was never reported, which is not the same as zero.

use crate::value::{self, Scalar};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Opaque device identifier, normalized to its string form
pub type DeviceId = String;

/// Last known reading per quantity code for one device
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DeviceReadingState {
    slots: BTreeMap<String, Scalar>,
}

impl DeviceReadingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one raw value for `code`.
    ///
    /// Returns the stored scalar, or `None` when the value normalized to
    /// absent and the state was left untouched.
    pub fn merge(&mut self, code: &str, raw: &Value) -> Option<&Scalar> {
        let scalar = value::normalize(raw)?;
        self.slots.insert(code.to_string(), scalar);
        self.slots.get(code)
    }

    pub fn get(&self, code: &str) -> Option<&Scalar> {
        self.slots.get(code)
    }

    /// Whether `code` holds a displayable value
    pub fn presence(&self, code: &str) -> bool {
        value::presence(self.slots.get(code))
    }

    /// Addable value of `code`, 0 when unknown
    pub fn numeric(&self, code: &str) -> f64 {
        value::numeric(self.slots.get(code))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in code order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Reading states of every device seen this session, ordered by id
pub type ReadingTable = BTreeMap<DeviceId, DeviceReadingState>;

/// Fetch-or-create the device's state and merge one value into it
pub fn merge_reading<'a>(
    table: &'a mut ReadingTable,
    device: &str,
    code: &str,
    raw: &Value,
) -> Option<&'a Scalar> {
    table
        .entry(device.to_string())
        .or_default()
        .merge(code, raw)
}
