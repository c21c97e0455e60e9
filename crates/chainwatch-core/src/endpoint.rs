//! The `EndpointClient` trait: how the engine talks to the chain.

use async_trait::async_trait;

use crate::error::WatchError;
use crate::types::BlockResponse;

/// Chain access capability used by the indexing engine.
///
/// Implementations must be `Send + Sync`; the engine shares one client
/// between its poll loop and fetch workers as `Arc<dyn EndpointClient>`.
#[async_trait]
pub trait EndpointClient: Send + Sync {
    /// Current chain tip height.
    async fn current_height(&self) -> Result<u64, WatchError>;

    /// Full block (with transactions) at `height`.
    async fn block_at(&self, height: u64) -> Result<BlockResponse, WatchError>;
}
