//! HTTP JSON-RPC endpoint client backed by `reqwest`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use chainwatch_core::types::{parse_hex_u64, to_hex, Block, BlockResponse};
use chainwatch_core::{EndpointClient, WatchError};

use crate::error::TransportError;
use crate::request::{RpcCall, RpcReply};

pub const METHOD_BLOCK_NUMBER: &str = "eth_blockNumber";
pub const METHOD_GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";

/// Live endpoint client: JSON-RPC over HTTP POST.
pub struct HttpEndpointClient {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpEndpointClient {
    /// Create a client for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            http,
            next_id: AtomicU64::new(1),
        })
    }

    fn call(&self, method: &str, params: Vec<Value>) -> RpcCall {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        RpcCall::new(id, method, params)
    }

    async fn send(&self, call: &RpcCall) -> Result<RpcReply, TransportError> {
        let resp = self
            .http
            .post(&self.url)
            .json(call)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json::<RpcReply>()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))
    }

    /// `eth_blockNumber`, decoded from hex.
    pub async fn block_number(&self) -> Result<u64, TransportError> {
        let call = self.call(METHOD_BLOCK_NUMBER, vec![]);
        let result = self
            .send(&call)
            .await?
            .into_result()
            .map_err(TransportError::Rpc)?
            .ok_or_else(|| TransportError::EmptyResult(METHOD_BLOCK_NUMBER.to_string()))?;
        let hex: String = serde_json::from_value(result)?;
        parse_hex_u64(&hex).map_err(|e| TransportError::InvalidHex(e.to_string()))
    }

    /// `eth_getBlockByNumber(height, true)`: the block with full transaction objects.
    pub async fn block_by_number(&self, height: u64) -> Result<BlockResponse, TransportError> {
        let call = self.call(
            METHOD_GET_BLOCK_BY_NUMBER,
            vec![Value::String(to_hex(height)), Value::Bool(true)],
        );
        let reply = self.send(&call).await?;
        let id = reply.id.unwrap_or(call.id);
        let jsonrpc = reply.jsonrpc.clone();

        let result = reply
            .into_result()
            .map_err(TransportError::Rpc)?
            .ok_or_else(|| {
                TransportError::EmptyResult(format!("{METHOD_GET_BLOCK_BY_NUMBER}({})", to_hex(height)))
            })?;
        let block: Block = serde_json::from_value(result)?;

        Ok(BlockResponse {
            id,
            jsonrpc,
            result: block,
        })
    }
}

#[async_trait]
impl EndpointClient for HttpEndpointClient {
    async fn current_height(&self) -> Result<u64, WatchError> {
        Ok(self.block_number().await?)
    }

    async fn block_at(&self, height: u64) -> Result<BlockResponse, WatchError> {
        Ok(self.block_by_number(height).await?)
    }
}
