//! # meterstream - live telemetry client for metering dashboards
//!
//! Subscribes to a metering backend's event stream, keeps a last-known-value
//! view of every device's readings and status, and publishes immutable
//! snapshots a renderer can draw from.
//!
//! ## Architecture
//!
//! - `value`: normalization of raw wire values
//! - `reading`: per-device reading state and the last-known-value merge
//! - `status`: per-device status state
//! - `quantity`: quantity codes and the row catalogue
//! - `phase`: per-phase values and totals for display
//! - `wire`: decoding of every historical frame shape
//! - `dashboard`: state owner, dispatcher and snapshot publisher
//! - `transport`: WebSocket and long-poll transports behind a reconnecting manager
//! - `session`: wiring for a running client
//! - `config`, `logging`, `error`: the usual plumbing

pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod phase;
pub mod quantity;
pub mod reading;
pub mod session;
pub mod status;
pub mod transport;
pub mod value;
pub mod wire;

// Re-export commonly used types
pub use config::Config;
pub use dashboard::{Dashboard, DashboardSnapshot};
pub use error::{MeterstreamError, Result};
pub use session::{Session, ShutdownHandle};
pub use transport::{ConnectionState, Transport, TransportManager};
