//! Error types for the chainwatch pipeline.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while tracking the chain or serving queries.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Transport or decoding failure talking to the chain endpoint.
    #[error("endpoint error: {0}")]
    Endpoint(String),

    /// Relay trace file could not be read or written.
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    /// Malformed caller input (e.g. a missing address).
    #[error("invalid request: {0}")]
    Validation(String),

    /// A value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl WatchError {
    /// Build an [`WatchError::Io`] for `path`.
    pub fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    /// Returns `true` if the failure should be absorbed and retried on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Endpoint(_))
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_endpoint_errors_are_transient() {
        assert!(WatchError::Endpoint("timeout".into()).is_transient());
        assert!(!WatchError::Validation("missing address".into()).is_transient());
        assert!(!WatchError::io(Path::new("relay.json"), "denied").is_transient());
    }

    #[test]
    fn io_error_names_the_path() {
        let err = WatchError::io(Path::new("testdata/relay.json"), "permission denied");
        assert_eq!(
            err.to_string(),
            "I/O error on testdata/relay.json: permission denied"
        );
    }
}
