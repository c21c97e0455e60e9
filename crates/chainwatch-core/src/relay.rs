//! Relay recorder: an append-only trace of fetched blocks.
//!
//! The trace is written as a JSON array of `{"BlockNumber": n, "Block": {...}}`
//! objects in append order and can be replayed later through the replay
//! endpoint client.

use std::path::Path;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::WatchError;
use crate::types::BlockResponse;

/// One recorded fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEntry {
    #[serde(rename = "BlockNumber")]
    pub block_number: u64,
    #[serde(rename = "Block")]
    pub block: BlockResponse,
}

/// In-process relay trace.
///
/// Recording is a no-op unless the recorder was created enabled.
#[derive(Debug, Default)]
pub struct RelayRecorder {
    enabled: bool,
    entries: Mutex<Vec<RelayEntry>>,
}

impl RelayRecorder {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append `(height, block)` to the trace.
    pub fn record(&self, height: u64, block: BlockResponse) {
        if !self.enabled {
            return;
        }
        self.entries.lock().push(RelayEntry {
            block_number: height,
            block,
        });
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of the trace in append order.
    pub fn entries(&self) -> Vec<RelayEntry> {
        self.entries.lock().clone()
    }

    /// Write the full trace to `path`, replacing any existing file.
    ///
    /// Returns the number of entries written.
    pub async fn flush(&self, path: &Path) -> Result<usize, WatchError> {
        let entries = self.entries();
        let bytes = serde_json::to_vec(&entries)?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| WatchError::io(path, e))?;
        tracing::info!(path = %path.display(), entries = entries.len(), "relay trace saved");
        Ok(entries.len())
    }
}

/// Load a relay trace previously written by [`RelayRecorder::flush`].
pub async fn load_trace(path: &Path) -> Result<Vec<RelayEntry>, WatchError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| WatchError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| WatchError::io(path, e))
}
