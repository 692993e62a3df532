//! Dashboard state owner and dispatcher
//!
//! `Dashboard` is the single owner of everything the UI shows: the reading
//! and status tables, the last-seen clock, the status-line message and the
//! connection state. The transport manager drives it by `&mut`; readers get
//! immutable snapshots over a `watch` channel.

pub mod format;

use crate::error::Result;
use crate::logging::{LogContext, StructuredLogger, get_logger, get_logger_with_context};
use crate::phase::{AggregatedQuantity, device_rows};
use crate::quantity::QuantityRow;
use crate::reading::{ReadingTable, merge_reading};
use crate::status::{StatusRecord, StatusTable, merge_status};
use crate::transport::ConnectionState;
use crate::value::Scalar;
use crate::wire::{self, Inbound, Payload, ReadingEvent};
use format::{NOT_AVAILABLE, clock_strings, si_format};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Initial status-line message
pub const LOADING_MESSAGE: &str = "Loading...";

/// Status-line message after a transport failure
pub const TRANSPORT_ERROR_MESSAGE: &str = "Error retrieving updates";

/// Immutable view published after every applied frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub readings: ReadingTable,
    pub statuses: StatusTable,
    /// Unix ms of the newest reading
    pub last_seen: Option<i64>,
    pub date: String,
    pub time: String,
    pub message: String,
    pub connection: ConnectionState,
    /// Frames that changed state so far
    pub frames_applied: u64,
}

impl DashboardSnapshot {
    /// Catalogue rows with data for `device`
    pub fn rows(&self, device: &str) -> Vec<(&'static QuantityRow, AggregatedQuantity)> {
        self.readings
            .get(device)
            .map(device_rows)
            .unwrap_or_default()
    }
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            readings: ReadingTable::new(),
            statuses: StatusTable::new(),
            last_seen: None,
            date: NOT_AVAILABLE.to_string(),
            time: NOT_AVAILABLE.to_string(),
            message: LOADING_MESSAGE.to_string(),
            connection: ConnectionState::Closed,
            frames_applied: 0,
        }
    }
}

/// Live dashboard state
pub struct Dashboard {
    state: DashboardSnapshot,
    snapshot_tx: watch::Sender<Arc<DashboardSnapshot>>,
    snapshot_rx: watch::Receiver<Arc<DashboardSnapshot>>,
    logger: StructuredLogger,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("devices", &self.state.readings.len())
            .field("connection", &self.state.connection)
            .finish()
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        let state = DashboardSnapshot::default();
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(state.clone()));
        Self {
            state,
            snapshot_tx,
            snapshot_rx,
            logger: get_logger("dashboard"),
        }
    }

    /// Receiver of published snapshots
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Published snapshots as a stream, starting with the current one
    pub fn snapshot_stream(&self) -> WatchStream<Arc<DashboardSnapshot>> {
        WatchStream::new(self.subscribe())
    }

    /// Current state, including anything not yet published
    pub fn state(&self) -> &DashboardSnapshot {
        &self.state
    }

    pub fn readings(&self) -> &ReadingTable {
        &self.state.readings
    }

    pub fn statuses(&self) -> &StatusTable {
        &self.state.statuses
    }

    pub fn message(&self) -> &str {
        &self.state.message
    }

    pub fn connection(&self) -> ConnectionState {
        self.state.connection
    }

    /// Decode a text frame and apply every payload it carries.
    ///
    /// Returns how many payloads changed state. Malformed JSON is an error
    /// for the caller to log; the dashboard is left untouched.
    pub fn apply_frame(&mut self, text: &str) -> Result<usize> {
        let items = wire::decode_frame(text)?;
        Ok(self.apply_all(items))
    }

    /// Apply an already parsed frame
    pub fn apply_value(&mut self, value: &Value) -> usize {
        self.apply_all(wire::decode_value(value))
    }

    fn apply_all(&mut self, items: Vec<Inbound>) -> usize {
        let applied = items.into_iter().filter(|item| self.apply(item)).count();
        if applied > 0 {
            self.state.frames_applied += 1;
            self.publish();
        }
        applied
    }

    /// Apply one decoded payload without publishing
    pub fn apply(&mut self, item: &Inbound) -> bool {
        match &item.payload {
            Payload::StatusBatch { shape, records } => {
                for record in records {
                    self.apply_status(record);
                }
                self.logger.debug(&format!(
                    "Merged {} status record(s) ({:?})",
                    records.len(),
                    shape
                ));
                !records.is_empty()
            }
            Payload::Reading(event) => {
                self.apply_reading(event, item.logged_at);
                true
            }
            Payload::Unrecognized => {
                self.logger.debug("Ignoring unrecognized payload");
                false
            }
        }
    }

    fn apply_status(&mut self, record: &StatusRecord) {
        let before = self
            .state
            .statuses
            .get(&record.device)
            .and_then(|s| s.status())
            .map(str::to_string);
        merge_status(&mut self.state.statuses, record);
        let after = self
            .state
            .statuses
            .get(&record.device)
            .and_then(|s| s.status());

        if let Some(after) = after
            && before.as_deref() != Some(after)
        {
            get_logger_with_context(LogContext::new("status").with_device(&record.device)).info(
                &format!(
                    "Status {} -> {}",
                    before.as_deref().unwrap_or("unknown"),
                    after
                ),
            );
        }
    }

    fn apply_reading(&mut self, event: &ReadingEvent, logged_at: Option<i64>) {
        let shown = match merge_reading(
            &mut self.state.readings,
            &event.device,
            &event.code,
            &event.value,
        ) {
            Some(Scalar::Number(n)) => si_format(*n),
            Some(Scalar::Text(t)) => t.clone(),
            None => si_format(0.0),
        };

        let seen = event
            .timestamp
            .or(logged_at)
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        self.touch(seen);
        self.state.message = format!("Received {} / {}: {}", event.device, event.code, shown);
    }

    fn touch(&mut self, unix_ms: i64) {
        self.state.last_seen = Some(unix_ms);
        if let Some((date, time)) = clock_strings(unix_ms, &chrono::Local) {
            self.state.date = date;
            self.state.time = time;
        }
    }

    /// Record a connection state change and publish it
    pub fn set_connection(&mut self, connection: ConnectionState) {
        if self.state.connection != connection {
            self.state.connection = connection;
            self.publish();
        }
    }

    /// Surface a transport failure on the status line
    pub fn note_transport_error(&mut self) {
        if self.state.message != TRANSPORT_ERROR_MESSAGE {
            self.state.message = TRANSPORT_ERROR_MESSAGE.to_string();
            self.publish();
        }
    }

    fn publish(&self) {
        let _ = self.snapshot_tx.send(Arc::new(self.state.clone()));
    }
}
