//! Engine lifecycle state and progress counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Lifecycle of the indexing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Constructed, not yet running.
    Idle,
    /// Steady-state poll loop.
    Polling,
    /// Shutdown requested; draining in-flight fetches.
    Stopping,
    /// Terminated.
    Stopped,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Polling => write!(f, "polling"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// `latest_known` and `indexed` heights.
///
/// Both counters only ever increase: fetch workers may finish out of height
/// order, so every write is a compare-and-only-increase.
#[derive(Debug, Default)]
pub struct Progress {
    latest_known: AtomicU64,
    indexed: AtomicU64,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest height the chain has reportedly reached.
    pub fn latest_known(&self) -> u64 {
        self.latest_known.load(Ordering::Acquire)
    }

    /// Highest height whose transactions have been filtered into the index.
    pub fn indexed(&self) -> u64 {
        self.indexed.load(Ordering::Acquire)
    }

    /// Raise `latest_known` to `height`. Returns `true` if it moved.
    pub fn advance_latest(&self, height: u64) -> bool {
        self.latest_known.fetch_max(height, Ordering::AcqRel) < height
    }

    /// Raise `indexed` to `height`. Returns `true` if it moved.
    pub fn advance_indexed(&self, height: u64) -> bool {
        self.indexed.fetch_max(height, Ordering::AcqRel) < height
    }
}
