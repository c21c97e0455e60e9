//! chainwatch-rpc: endpoint clients for ChainWatch.
//!
//! - [`HttpEndpointClient`]: live JSON-RPC over HTTP (`eth_blockNumber`,
//!   `eth_getBlockByNumber`)
//! - [`ReplayEndpointClient`]: deterministic playback of a relay trace
//! - [`connect`]: picks one of them from a [`WatchConfig`]

pub mod error;
pub mod http;
pub mod replay;
pub mod request;

use std::sync::Arc;

use chainwatch_core::{EndpointClient, EndpointMode, WatchConfig, WatchError};

pub use error::TransportError;
pub use http::HttpEndpointClient;
pub use replay::ReplayEndpointClient;
pub use request::{NodeError, RpcCall, RpcReply};

/// Build the endpoint client selected by `config`.
///
/// Replay mode reads the trace file up front; an unreadable or empty trace is
/// an error.
pub async fn connect(config: &WatchConfig) -> Result<Arc<dyn EndpointClient>, WatchError> {
    match config.endpoint_mode() {
        EndpointMode::Live { url } => {
            tracing::info!(%url, "using live endpoint");
            let client = HttpEndpointClient::new(url, config.request_timeout())?;
            Ok(Arc::new(client))
        }
        EndpointMode::Replay { trace } => {
            let client = ReplayEndpointClient::from_file(&trace)
                .await?
                .with_step_delay(config.replay_step());
            if client.is_empty() {
                return Err(WatchError::Validation(format!(
                    "relay trace {} has no blocks",
                    trace.display()
                )));
            }
            tracing::info!(
                trace = %trace.display(),
                blocks = client.len(),
                step_ms = config.replay_step_ms,
                "using replay endpoint"
            );
            Ok(Arc::new(client))
        }
    }
}
