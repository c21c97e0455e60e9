//! The JSON-RPC envelope used by the live client.
//!
//! Calls always carry a numeric id. A reply holds either `result` or `error`;
//! a `null` (or absent) result means the node has nothing for the query yet.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcCall {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcCall {
    pub fn new(id: u64, method: &str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// Error object a node returns instead of a result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeError {
    pub code: i64,
    pub message: String,
}

/// Incoming reply.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcReply {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<NodeError>,
}

impl RpcReply {
    /// `Ok(None)` for a null result, `Err` if the node reported an error.
    pub fn into_result(self) -> Result<Option<Value>, NodeError> {
        match (self.error, self.result) {
            (Some(err), _) => Err(err),
            (None, Value::Null) => Ok(None),
            (None, value) => Ok(Some(value)),
        }
    }
}
