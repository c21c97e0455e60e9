//! Shared types for the indexing pipeline.
//!
//! Field names follow the `eth_getBlockByNumber` wire shape so that blocks can
//! be stored in a relay trace exactly as the endpoint returned them.

use serde::{Deserialize, Serialize};

use crate::error::WatchError;

// ─── Transaction ─────────────────────────────────────────────────────────────

/// A transaction as returned inside a full block.
///
/// `value` is kept as the endpoint's hex string so arbitrary-precision amounts
/// survive untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction hash (`0x…`).
    pub hash: String,
    /// Sender address.
    pub from: String,
    /// Recipient address; `None` for contract creation.
    pub to: Option<String>,
    /// Transferred value, hex encoded.
    pub value: String,
    /// Height of the block that included this transaction.
    #[serde(rename = "blockNumber", with = "hex_height")]
    pub block_number: u64,
}

impl Transaction {
    /// Sender, then recipient if there is one.
    ///
    /// Each side is reported on its own, so a self-transfer yields its
    /// address twice.
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.from.as_str()).chain(self.to.as_deref())
    }
}

// ─── Block ───────────────────────────────────────────────────────────────────

/// A block with its full transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block height.
    #[serde(with = "hex_height")]
    pub number: u64,
    /// Block hash (`0x…`).
    pub hash: String,
    /// Transactions in block order.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// The raw `eth_getBlockByNumber` response object.
///
/// This is the unit recorded in a relay trace and handed back by the replay
/// client, so it keeps the JSON-RPC envelope around the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockResponse {
    pub id: u64,
    pub jsonrpc: String,
    pub result: Block,
}

impl BlockResponse {
    /// Wrap `block` in a JSON-RPC 2.0 envelope.
    pub fn new(id: u64, block: Block) -> Self {
        Self {
            id,
            jsonrpc: "2.0".into(),
            result: block,
        }
    }

    pub fn block(&self) -> &Block {
        &self.result
    }
}

// ─── Hex heights ─────────────────────────────────────────────────────────────

/// Parse a `0x`-prefixed base-16 height.
pub fn parse_hex_u64(s: &str) -> Result<u64, WatchError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| WatchError::Serialization(format!("missing 0x prefix: {s:?}")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| WatchError::Serialization(format!("invalid hex height {s:?}: {e}")))
}

/// Encode a height as lowercase `0x`-prefixed hex.
pub fn to_hex(n: u64) -> String {
    format!("{n:#x}")
}

/// Serde adapter for heights carried as hex strings.
pub mod hex_height {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hex_u64(&s).map_err(D::Error::custom)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
