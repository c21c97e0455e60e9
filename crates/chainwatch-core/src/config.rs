//! Process and engine configuration.
//!
//! A [`WatchConfig`] is built once at startup and passed by reference to the
//! endpoint factory and the engine builder. Nothing reads the environment
//! after that point.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WatchError;

/// Default upstream JSON-RPC endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://cloudflare-eth.com";

/// Configuration for the indexing engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Head polling interval (milliseconds).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Concurrent fetch workers. `0` fetches inline on the poll loop.
    #[serde(default = "default_fetch_workers")]
    pub fetch_workers: usize,
    /// Capacity of the fetch submission queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Record every fetched block into the relay trace.
    #[serde(default)]
    pub relay: bool,
}

fn default_poll_interval_ms() -> u64 { 10_000 }
fn default_fetch_workers() -> usize { 4 }
fn default_queue_capacity() -> usize { 10 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            fetch_workers: default_fetch_workers(),
            queue_capacity: default_queue_capacity(),
            relay: false,
        }
    }
}

impl EngineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Which endpoint client the process should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointMode {
    /// JSON-RPC over HTTP to this URL.
    Live { url: String },
    /// Replay a recorded relay trace from this file.
    Replay { trace: PathBuf },
}

/// Top-level process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// HTTP API listen port.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Upstream JSON-RPC endpoint URL.
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    /// Enable relay recording and the `/saveRelay` route.
    #[serde(default)]
    pub relay: bool,
    /// Replay `relay_file` instead of talking to `endpoint_url`.
    #[serde(default)]
    pub mock: bool,
    /// Relay trace file, written in relay mode and read in mock mode.
    #[serde(default = "default_relay_file")]
    pub relay_file: PathBuf,
    /// Per-request timeout for the live client (milliseconds).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Pause before every replayed call in mock mode (milliseconds, `0` = none).
    #[serde(default)]
    pub replay_step_ms: u64,
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_listen_port() -> u16 { 8080 }
fn default_endpoint_url() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_relay_file() -> PathBuf { PathBuf::from("testdata/relay.json") }
fn default_request_timeout_ms() -> u64 { 30_000 }

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            endpoint_url: default_endpoint_url(),
            relay: false,
            mock: false,
            relay_file: default_relay_file(),
            request_timeout_ms: default_request_timeout_ms(),
            replay_step_ms: 0,
            engine: EngineConfig::default(),
        }
    }
}

impl WatchConfig {
    /// Check invariants the rest of the process relies on.
    pub fn validate(&self) -> Result<(), WatchError> {
        if self.engine.poll_interval_ms == 0 {
            return Err(WatchError::Validation("poll interval must be positive".into()));
        }
        if self.engine.queue_capacity == 0 {
            return Err(WatchError::Validation("queue capacity must be positive".into()));
        }
        if !self.mock && self.endpoint_url.is_empty() {
            return Err(WatchError::Validation("endpoint URL is required".into()));
        }
        Ok(())
    }

    pub fn endpoint_mode(&self) -> EndpointMode {
        if self.mock {
            EndpointMode::Replay {
                trace: self.relay_file.clone(),
            }
        } else {
            EndpointMode::Live {
                url: self.endpoint_url.clone(),
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Engine settings with relay recording following the top-level `relay` flag.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            relay: self.relay,
            ..self.engine.clone()
        }
    }

    pub fn replay_step(&self) -> Duration {
        Duration::from_millis(self.replay_step_ms)
    }
}
