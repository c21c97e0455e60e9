//! Transport-level error types.

use thiserror::Error;

use chainwatch_core::WatchError;

use crate::request::NodeError;

/// Errors that can occur while talking to a JSON-RPC endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, non-2xx, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(NodeError),

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A height field was not valid `0x`-prefixed hex.
    #[error("Invalid hex quantity: {0}")]
    InvalidHex(String),

    /// The node answered with a `null` result (e.g. block not produced yet).
    #[error("Empty result for {0}")]
    EmptyResult(String),
}

impl From<TransportError> for WatchError {
    fn from(err: TransportError) -> Self {
        WatchError::Endpoint(err.to_string())
    }
}
