//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentBlockResponse {
    pub current_block: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub subscribed: bool,
}

/// Query string of `GET /getTransactions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionsQuery {
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRelayResponse {
    pub entries: usize,
}
