//! A running dashboard session
//!
//! Wires one transport, one manager and one dashboard together and hands
//! out the read side (snapshots, connection state) and a shutdown handle.

use crate::config::{Config, TransportConfig, TransportKind};
use crate::dashboard::{Dashboard, DashboardSnapshot};
use crate::error::{MeterstreamError, Result};
use crate::transport::{ConnectionState, Transport, TransportManager};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

#[cfg(feature = "poll")]
use crate::transport::poll::PollTransport;
#[cfg(feature = "socket")]
use crate::transport::socket::SocketTransport;

/// Requests a session to stop; cheap to clone and send across tasks
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Close the active connection and stop reconnecting
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Build the transport selected by `config.kind`
pub fn build_transport(config: &TransportConfig) -> Result<Box<dyn Transport>> {
    match config.kind {
        #[cfg(feature = "socket")]
        TransportKind::Socket => Ok(Box::new(SocketTransport::new(config.socket_url()))),
        #[cfg(feature = "poll")]
        TransportKind::Poll => Ok(Box::new(PollTransport::new(config))),
        #[allow(unreachable_patterns)]
        other => Err(MeterstreamError::config(format!(
            "{:?} transport is not enabled in this build",
            other
        ))),
    }
}

/// Dashboard fed by a reconnecting transport
pub struct Session {
    dashboard: Dashboard,
    manager: TransportManager,
    shutdown: ShutdownHandle,
    shutdown_rx: watch::Receiver<bool>,
}

impl Session {
    /// Validate `config` and build the configured transport
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let transport = build_transport(&config.transport)?;
        Ok(Self::with_transport(transport, &config.transport))
    }

    /// Session over a caller-supplied transport
    pub fn with_transport(transport: Box<dyn Transport>, config: &TransportConfig) -> Self {
        let (tx, shutdown_rx) = watch::channel(false);
        Self {
            dashboard: Dashboard::new(),
            manager: TransportManager::new(
                transport,
                config.reconnect_delay(),
                config.connect_timeout(),
            ),
            shutdown: ShutdownHandle { tx: Arc::new(tx) },
            shutdown_rx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.dashboard.subscribe()
    }

    pub fn snapshot_stream(&self) -> WatchStream<Arc<DashboardSnapshot>> {
        self.dashboard.snapshot_stream()
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.manager.subscribe_state()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Connect attempts made so far
    pub fn attempts(&self) -> u64 {
        self.manager.attempts()
    }

    /// Run until shut down
    pub async fn run(&mut self) {
        self.manager
            .run(&mut self.dashboard, self.shutdown_rx.clone())
            .await;
    }
}
