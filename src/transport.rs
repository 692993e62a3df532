//! Event transports and the reconnecting transport manager
//!
//! A [`Transport`] knows how to open one connection to the backend and pull
//! frames from it. The [`TransportManager`] owns exactly one transport and
//! drives it through `Closed -> Connecting -> Open -> Closed` forever,
//! waiting a fixed delay between a close and the next attempt. Frames are
//! applied to the [`Dashboard`] in arrival order.

#[cfg(feature = "poll")]
pub mod poll;
#[cfg(feature = "socket")]
pub mod socket;

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::logging::{StructuredLogger, get_logger};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Closed,
    Connecting,
    Open,
}

/// One inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Raw text, decoded by the dashboard
    Text(String),
    /// Already parsed by the transport
    Json(Value),
}

/// A strategy for receiving frames from the backend
#[async_trait]
pub trait Transport: Send {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Open a connection. Called only while no connection is open.
    async fn connect(&mut self) -> Result<()>;

    /// Next frame; `Ok(None)` when the peer closed the connection.
    /// Must be safe to drop mid-await.
    async fn recv(&mut self) -> Result<Option<Frame>>;

    /// Release the connection, if any
    async fn close(&mut self);
}

/// Resolves once shutdown has been requested. A dropped sender never
/// resolves.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// How an open connection ended
enum Ended {
    Shutdown,
    PeerClosed,
    Failed,
}

/// Drives a single transport with infinite, fixed-delay reconnects
pub struct TransportManager {
    transport: Box<dyn Transport>,
    reconnect_delay: Duration,
    connect_timeout: Duration,
    attempts: u64,
    state_tx: watch::Sender<ConnectionState>,
    state_rx: watch::Receiver<ConnectionState>,
    logger: StructuredLogger,
}

impl TransportManager {
    pub fn new(
        transport: Box<dyn Transport>,
        reconnect_delay: Duration,
        connect_timeout: Duration,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Closed);
        Self {
            transport,
            reconnect_delay,
            connect_timeout,
            attempts: 0,
            state_tx,
            state_rx,
            logger: get_logger("transport"),
        }
    }

    /// Connect attempts made so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Receiver of connection state changes
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    fn set_state(&self, state: ConnectionState, dashboard: &mut Dashboard) {
        self.state_tx.send_replace(state);
        dashboard.set_connection(state);
    }

    /// Run until `shutdown` turns true. Never returns on transport errors.
    pub async fn run(&mut self, dashboard: &mut Dashboard, mut shutdown: watch::Receiver<bool>) {
        let name = self.transport.name();
        self.logger
            .info(&format!("Starting {} transport", name));

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.attempts += 1;
            self.set_state(ConnectionState::Connecting, dashboard);
            self.logger.debug(&format!(
                "Connect attempt {} via {}",
                self.attempts, name
            ));

            let connect_timeout = self.connect_timeout;
            let connected = tokio::select! {
                _ = shutdown_requested(&mut shutdown) => None,
                r = timeout(connect_timeout, self.transport.connect()) => Some(r),
            };

            let ended = match connected {
                None => Ended::Shutdown,
                Some(Ok(Ok(()))) => {
                    self.set_state(ConnectionState::Open, dashboard);
                    self.logger.info(&format!(
                        "Connected via {} after {} attempt(s)",
                        name, self.attempts
                    ));
                    self.pump(dashboard, &mut shutdown).await
                }
                Some(Ok(Err(e))) => {
                    self.logger
                        .warn(&format!("Connect attempt {} failed: {}", self.attempts, e));
                    Ended::Failed
                }
                Some(Err(_)) => {
                    self.logger.warn(&format!(
                        "Connect attempt {} timed out after {:?}",
                        self.attempts, connect_timeout
                    ));
                    Ended::Failed
                }
            };

            self.transport.close().await;
            self.set_state(ConnectionState::Closed, dashboard);

            match ended {
                Ended::Shutdown => break,
                Ended::Failed => dashboard.note_transport_error(),
                Ended::PeerClosed => {}
            }

            let delay = self.reconnect_delay;
            let stop = tokio::select! {
                _ = shutdown_requested(&mut shutdown) => true,
                _ = sleep(delay) => false,
            };
            if stop {
                break;
            }
        }

        self.logger.info(&format!(
            "Stopped {} transport after {} attempt(s)",
            name, self.attempts
        ));
    }

    async fn pump(
        &mut self,
        dashboard: &mut Dashboard,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Ended {
        loop {
            let next = tokio::select! {
                _ = shutdown_requested(shutdown) => return Ended::Shutdown,
                r = self.transport.recv() => r,
            };
            match next {
                Ok(Some(frame)) => self.dispatch(frame, dashboard),
                Ok(None) => {
                    self.logger.info("Connection closed by peer");
                    return Ended::PeerClosed;
                }
                Err(e) => {
                    self.logger.warn(&format!("Receive failed: {}", e));
                    return Ended::Failed;
                }
            }
        }
    }

    fn dispatch(&self, frame: Frame, dashboard: &mut Dashboard) {
        match frame {
            Frame::Text(text) => {
                if let Err(e) = dashboard.apply_frame(&text) {
                    self.logger
                        .warn(&format!("Dropping undecodable frame: {}", e));
                }
            }
            Frame::Json(value) => {
                dashboard.apply_value(&value);
            }
        }
    }
}
