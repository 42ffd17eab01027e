//! Error types for the disc core.

use thiserror::Error;

/// Failure to turn a text frame into a [`NetworkMessage`](crate::protocol::NetworkMessage).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message has no numeric `type` tag")]
    MissingType,
    #[error("message of type {0} has no `data` object")]
    MissingData(u8),
    #[error("message of type {0} carries a non-finite pose")]
    NonFinite(u8),
}

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,
    #[error("send failed: {0}")]
    Send(String),
}

/// Failure loading or validating a [`DiscConfig`](crate::config::DiscConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}
