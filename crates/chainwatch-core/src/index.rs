//! Transaction index: matched transactions grouped by address.
//!
//! Append order is discovery order, not chain order: blocks fetched
//! concurrently may complete out of height order.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::Transaction;

/// Concurrency-safe mapping from address to its matched transactions.
#[derive(Debug, Default)]
pub struct TransactionIndex {
    by_address: RwLock<HashMap<String, Vec<Transaction>>>,
}

impl TransactionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one transaction to `address`'s list.
    pub fn record_match(&self, address: &str, tx: Transaction) {
        self.by_address
            .write()
            .entry(address.to_string())
            .or_default()
            .push(tx);
    }

    /// Append a batch of transactions to `address`'s list, preserving their order.
    pub fn record_matches(&self, address: &str, txs: impl IntoIterator<Item = Transaction>) {
        let mut txs = txs.into_iter().peekable();
        if txs.peek().is_none() {
            return;
        }
        self.by_address
            .write()
            .entry(address.to_string())
            .or_default()
            .extend(txs);
    }

    /// Snapshot of the transactions recorded for `address` (empty if none).
    pub fn transactions_for(&self, address: &str) -> Vec<Transaction> {
        self.by_address
            .read()
            .get(address)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(hash: &str) -> Transaction {
        Transaction {
            hash: hash.into(),
            from: "0x123456789abcdef123".into(),
            to: Some("0xabcdef123123456789".into()),
            value: "0x0".into(),
            block_number: 1,
        }
    }

    #[test]
    fn single_and_batch_appends_keep_order() {
        let index = TransactionIndex::new();
        index.record_match("0xabcdef123", tx("0x1"));
        index.record_matches("0xabcdef123", vec![tx("0x2"), tx("0x3"), tx("0x4")]);

        let hashes: Vec<_> = index
            .transactions_for("0xabcdef123")
            .into_iter()
            .map(|t| t.hash)
            .collect();
        assert_eq!(hashes, vec!["0x1", "0x2", "0x3", "0x4"]);
    }

    #[test]
    fn unknown_address_is_empty() {
        let index = TransactionIndex::new();
        assert!(index.transactions_for("0xnobody").is_empty());
    }

    #[test]
    fn empty_batch_creates_no_entry() {
        let index = TransactionIndex::new();
        index.record_matches("0xabc", Vec::new());
        assert!(index.by_address.read().is_empty());
    }

    #[test]
    fn snapshot_is_detached() {
        let index = TransactionIndex::new();
        index.record_match("0xabc", tx("0x1"));
        let snapshot = index.transactions_for("0xabc");
        index.record_match("0xabc", tx("0x2"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(index.transactions_for("0xabc").len(), 2);
    }
}
