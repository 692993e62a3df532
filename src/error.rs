//! Error types and handling for meterstream
//!
//! Only setup paths (configuration, logging, building a transport) return
//! these errors to callers. Inside a running session transport and decode
//! failures are logged and recovered from, never propagated.

use thiserror::Error;

/// Result type alias for meterstream operations
pub type Result<T> = std::result::Result<T, MeterstreamError>;

/// Main error type for meterstream
#[derive(Debug, Error)]
pub enum MeterstreamError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport lifecycle errors (connect, receive, peer close)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Network-level errors from the HTTP or socket client
    #[error("Network error: {message}")]
    Network { message: String },

    /// Frame or payload decoding errors
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },
}

impl MeterstreamError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        MeterstreamError::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        MeterstreamError::Transport {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        MeterstreamError::Network {
            message: message.into(),
        }
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        MeterstreamError::Decode {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        MeterstreamError::Io {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        MeterstreamError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        MeterstreamError::Timeout {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for MeterstreamError {
    fn from(err: std::io::Error) -> Self {
        MeterstreamError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for MeterstreamError {
    fn from(err: serde_yaml::Error) -> Self {
        MeterstreamError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MeterstreamError {
    fn from(err: serde_json::Error) -> Self {
        MeterstreamError::decode(err.to_string())
    }
}

#[cfg(feature = "poll")]
impl From<reqwest::Error> for MeterstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MeterstreamError::timeout(err.to_string())
        } else {
            MeterstreamError::network(err.to_string())
        }
    }
}

#[cfg(feature = "socket")]
impl From<tokio_tungstenite::tungstenite::Error> for MeterstreamError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        MeterstreamError::network(err.to_string())
    }
}
