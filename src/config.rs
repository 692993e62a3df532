//! Configuration management for meterstream
//!
//! This module handles loading, validation, and management of the client
//! configuration from YAML files.

use crate::error::{MeterstreamError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event transport configuration
    pub transport: TransportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Which transport strategy feeds the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Persistent WebSocket receiving unsolicited frames
    Socket,
    /// Long-poll loop over the buffered firehose endpoint
    Poll,
}

/// Event transport parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Transport strategy
    pub kind: TransportKind,

    /// Backend host name or IP address
    pub host: String,

    /// Backend TCP port
    pub port: u16,

    /// Path of the WebSocket endpoint
    pub socket_path: String,

    /// Path of the long-poll endpoint
    pub poll_path: String,

    /// Long-poll timeout passed to the backend, in seconds
    pub poll_timeout_secs: u64,

    /// Firehose category to subscribe to
    pub category: String,

    /// Delay between a closed connection and the next connect attempt
    pub reconnect_delay_ms: u64,

    /// Upper bound for a single connect attempt
    pub connect_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-only level override
    pub console_level: Option<String>,

    /// Optional file-only level override
    pub file_level: Option<String>,

    /// Path to log file (its directory is used for rotation)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl TransportConfig {
    /// Reconnect delay as a `Duration`
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// URL of the WebSocket endpoint
    pub fn socket_url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, self.socket_path)
    }

    /// URL of the firehose endpoint, without its query
    pub fn poll_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.poll_path)
    }

    /// Query pairs of the next long-poll request; `since` is the firehose
    /// cursor in unix ms. Values are left unencoded for the HTTP client.
    pub fn poll_query(&self, since: Option<i64>) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("timeout", self.poll_timeout_secs.to_string()),
            ("category", self.category.clone()),
        ];
        if let Some(since) = since {
            query.push(("since_time", since.to_string()));
        }
        query
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let default_paths = ["meterstream.yaml", "/etc/meterstream/config.yaml"];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let t = &self.transport;

        if t.host.trim().is_empty() {
            return Err(MeterstreamError::validation(
                "transport.host",
                "Host cannot be empty",
            ));
        }

        if t.port == 0 {
            return Err(MeterstreamError::validation(
                "transport.port",
                "Port must be greater than 0",
            ));
        }

        if t.reconnect_delay_ms == 0 {
            return Err(MeterstreamError::validation(
                "transport.reconnect_delay_ms",
                "Must be greater than 0",
            ));
        }

        if t.connect_timeout_ms == 0 {
            return Err(MeterstreamError::validation(
                "transport.connect_timeout_ms",
                "Must be greater than 0",
            ));
        }

        if t.kind == TransportKind::Poll && t.category.trim().is_empty() {
            return Err(MeterstreamError::validation(
                "transport.category",
                "Category cannot be empty",
            ));
        }

        if t.kind == TransportKind::Poll && t.poll_timeout_secs == 0 {
            return Err(MeterstreamError::validation(
                "transport.poll_timeout_secs",
                "Must be greater than 0",
            ));
        }

        for (field, path) in [
            ("transport.socket_path", &t.socket_path),
            ("transport.poll_path", &t.poll_path),
        ] {
            if !path.starts_with('/') {
                return Err(MeterstreamError::validation(field, "Must start with '/'"));
            }
        }

        Ok(())
    }
}
