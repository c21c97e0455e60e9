//! Replay endpoint client: plays back a recorded relay trace.
//!
//! Each `current_height` call simulates the chain growing by one block:
//!
//! ```text
//! call 1   → first recorded height − 1   (baseline; cursor armed at 0)
//! call 2   → trace[0].height             (trace[0] becomes the current block)
//! call k+1 → trace[k-1].height
//! call k+2 → "no more blocks"
//! ```
//!
//! `block_at` ignores its argument and returns the block whose height was
//! reported last, so a trace is expected to hold consecutive heights.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use chainwatch_core::relay::{load_trace, RelayEntry};
use chainwatch_core::types::BlockResponse;
use chainwatch_core::{EndpointClient, WatchError};

const NO_MORE_BLOCKS: &str = "no more blocks";

#[derive(Debug, Default)]
struct Cursor {
    armed: bool,
    next: usize,
    current: Option<usize>,
}

/// Deterministic endpoint client driven by a relay trace.
pub struct ReplayEndpointClient {
    entries: Vec<RelayEntry>,
    cursor: Mutex<Cursor>,
    step_delay: Duration,
}

impl ReplayEndpointClient {
    pub fn new(entries: Vec<RelayEntry>) -> Self {
        Self {
            entries,
            cursor: Mutex::new(Cursor::default()),
            step_delay: Duration::ZERO,
        }
    }

    /// Load the trace written by a relay-mode run.
    pub async fn from_file(path: &Path) -> Result<Self, WatchError> {
        let entries = load_trace(path).await?;
        tracing::debug!(path = %path.display(), blocks = entries.len(), "loaded relay trace");
        Ok(Self::new(entries))
    }

    /// Sleep this long on every call, pacing playback like a live node.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn pace(&self) {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }

    fn advance(&self) -> Result<u64, WatchError> {
        let mut cursor = self.cursor.lock();
        if !cursor.armed {
            let first = self
                .entries
                .first()
                .ok_or_else(|| WatchError::Endpoint(NO_MORE_BLOCKS.into()))?;
            cursor.armed = true;
            return Ok(first.block_number.saturating_sub(1));
        }

        let idx = cursor.next;
        let entry = self
            .entries
            .get(idx)
            .ok_or_else(|| WatchError::Endpoint(NO_MORE_BLOCKS.into()))?;
        cursor.current = Some(idx);
        cursor.next += 1;
        Ok(entry.block_number)
    }

    fn current_block(&self) -> Result<BlockResponse, WatchError> {
        let cursor = self.cursor.lock();
        cursor
            .current
            .and_then(|idx| self.entries.get(idx))
            .map(|entry| entry.block.clone())
            .ok_or_else(|| WatchError::Endpoint(NO_MORE_BLOCKS.into()))
    }
}

#[async_trait]
impl EndpointClient for ReplayEndpointClient {
    async fn current_height(&self) -> Result<u64, WatchError> {
        let height = self.advance()?;
        self.pace().await;
        Ok(height)
    }

    async fn block_at(&self, _height: u64) -> Result<BlockResponse, WatchError> {
        let block = self.current_block()?;
        self.pace().await;
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainwatch_core::types::Block;

    fn entry(number: u64) -> RelayEntry {
        RelayEntry {
            block_number: number,
            block: BlockResponse::new(
                1,
                Block {
                    number,
                    hash: format!("0xhash{number}"),
                    transactions: vec![],
                },
            ),
        }
    }

    #[tokio::test]
    async fn first_call_reports_baseline() {
        let client = ReplayEndpointClient::new(vec![entry(100), entry(101), entry(102)]);
        assert_eq!(client.current_height().await.unwrap(), 99);
        // Armed, but nothing reported yet.
        assert!(client.block_at(100).await.is_err());
    }

    #[tokio::test]
    async fn replays_heights_in_trace_order() {
        let client = ReplayEndpointClient::new(vec![entry(100), entry(101), entry(102)]);
        client.current_height().await.unwrap();

        let mut heights = Vec::new();
        for _ in 0..3 {
            let h = client.current_height().await.unwrap();
            let block = client.block_at(h).await.unwrap();
            assert_eq!(block.block().number, h);
            heights.push(h);
        }
        assert_eq!(heights, vec![100, 101, 102]);

        let err = client.current_height().await.unwrap_err();
        assert_eq!(err.to_string(), "endpoint error: no more blocks");
    }

    #[tokio::test]
    async fn block_at_ignores_requested_height() {
        let client = ReplayEndpointClient::new(vec![entry(100), entry(101)]);
        client.current_height().await.unwrap();
        client.current_height().await.unwrap();
        assert_eq!(client.block_at(12345).await.unwrap().block().number, 100);
    }

    #[tokio::test]
    async fn empty_trace_cannot_start() {
        let client = ReplayEndpointClient::new(vec![]);
        assert!(client.is_empty());
        assert!(matches!(
            client.current_height().await,
            Err(WatchError::Endpoint(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn step_delay_paces_calls() {
        let client = ReplayEndpointClient::new(vec![entry(5)]).with_step_delay(Duration::from_secs(1));
        let start = tokio::time::Instant::now();
        client.current_height().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(1));
    }
}
