//! Fluent builder API for creating indexing engines.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use chainwatch_engine::EngineBuilder;
//! use chainwatch_rpc::HttpEndpointClient;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpEndpointClient::new("https://cloudflare-eth.com", Duration::from_secs(30))?;
//! let engine = EngineBuilder::new()
//!     .poll_interval(Duration::from_secs(12))
//!     .fetch_workers(8)
//!     .relay(true)
//!     .build(client);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chainwatch_core::{EndpointClient, EngineConfig};

use crate::engine::IndexingEngine;

/// Fluent builder for [`IndexingEngine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Set the head polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the number of concurrent fetch workers (`0` = fetch inline).
    pub fn fetch_workers(mut self, workers: usize) -> Self {
        self.config.fetch_workers = workers;
        self
    }

    /// Set the submission queue capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Enable relay recording.
    pub fn relay(mut self, enabled: bool) -> Self {
        self.config.relay = enabled;
        self
    }

    /// Build the `EngineConfig` without creating an engine.
    pub fn build_config(self) -> EngineConfig {
        self.config
    }

    /// Create the engine around a concrete client.
    pub fn build<C: EndpointClient + 'static>(self, client: C) -> Arc<IndexingEngine> {
        self.build_shared(Arc::new(client))
    }

    /// Create the engine around a shared client.
    pub fn build_shared(self, client: Arc<dyn EndpointClient>) -> Arc<IndexingEngine> {
        Arc::new(IndexingEngine::new(self.config, client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = EngineBuilder::new()
            .poll_interval(Duration::from_millis(250))
            .fetch_workers(0)
            .queue_capacity(64)
            .relay(true)
            .build_config();
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.fetch_workers, 0);
        assert_eq!(config.queue_capacity, 64);
        assert!(config.relay);
    }

    #[test]
    fn oversized_interval_saturates() {
        let config = EngineBuilder::new().poll_interval(Duration::MAX).build_config();
        assert_eq!(config.poll_interval_ms, u64::MAX);
    }

    #[test]
    fn from_config_keeps_values() {
        let base = EngineConfig {
            fetch_workers: 2,
            ..Default::default()
        };
        assert_eq!(EngineBuilder::from_config(&base).build_config(), base);
    }
}
