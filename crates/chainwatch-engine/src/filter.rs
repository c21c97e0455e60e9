//! Block filtering against the subscription set.

use std::collections::HashMap;

use chainwatch_core::types::{Block, Transaction};
use chainwatch_core::SubscriptionRegistry;

/// Group a block's transactions by the subscribed addresses they touch.
///
/// Sender and recipient are tested independently, so a transfer between two
/// subscribed addresses appears under both and a self-transfer of a
/// subscribed address appears twice. Per-address order is block order.
pub fn collect_matches<'a>(
    subscriptions: &SubscriptionRegistry,
    block: &'a Block,
) -> HashMap<&'a str, Vec<Transaction>> {
    let mut matches: HashMap<&str, Vec<Transaction>> = HashMap::new();
    if subscriptions.is_empty() {
        return matches;
    }
    for tx in &block.transactions {
        for address in tx.participants() {
            if subscriptions.is_subscribed(address) {
                matches.entry(address).or_default().push(tx.clone());
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(hash: &str, from: &str, to: &str) -> Transaction {
        Transaction {
            hash: hash.into(),
            from: from.into(),
            to: Some(to.into()),
            value: "0x0".into(),
            block_number: 100,
        }
    }

    fn block(txs: Vec<Transaction>) -> Block {
        Block {
            number: 100,
            hash: "0xblock".into(),
            transactions: txs,
        }
    }

    #[test]
    fn both_sides_subscribed() {
        let subs = SubscriptionRegistry::new();
        subs.subscribe("0xAAA");
        subs.subscribe("0xBBB");
        let b = block(vec![tx("0x1", "0xAAA", "0xBBB")]);

        let m = collect_matches(&subs, &b);
        assert_eq!(m["0xAAA"][0].hash, "0x1");
        assert_eq!(m["0xBBB"][0].hash, "0x1");
    }

    #[test]
    fn unsubscribed_transactions_dropped() {
        let subs = SubscriptionRegistry::new();
        subs.subscribe("0xAAA");
        let b = block(vec![tx("0x1", "0xCCC", "0xDDD"), tx("0x2", "0xDDD", "0xAAA")]);

        let m = collect_matches(&subs, &b);
        assert_eq!(m.len(), 1);
        assert_eq!(m["0xAAA"].len(), 1);
        assert_eq!(m["0xAAA"][0].hash, "0x2");
    }

    #[test]
    fn keeps_block_order_per_address() {
        let subs = SubscriptionRegistry::new();
        subs.subscribe("0xAAA");
        let b = block(vec![
            tx("0x1", "0xAAA", "0x111"),
            tx("0x2", "0x222", "0xAAA"),
            tx("0x3", "0xAAA", "0x333"),
        ]);
        let hashes: Vec<String> = collect_matches(&subs, &b)["0xAAA"]
            .iter()
            .map(|t| t.hash.clone())
            .collect();
        assert_eq!(hashes, vec!["0x1", "0x2", "0x3"]);
    }

    #[test]
    fn self_transfer_matches_each_side() {
        let subs = SubscriptionRegistry::new();
        subs.subscribe("0xAAA");
        let b = block(vec![tx("0x1", "0xAAA", "0xAAA")]);
        assert_eq!(collect_matches(&subs, &b)["0xAAA"].len(), 2);
    }

    #[test]
    fn no_subscriptions_no_matches() {
        let b = block(vec![tx("0x1", "0xAAA", "0xBBB")]);
        assert!(collect_matches(&SubscriptionRegistry::new(), &b).is_empty());
    }

    #[test]
    fn case_sensitive_match() {
        let subs = SubscriptionRegistry::new();
        subs.subscribe("0xaaa");
        let b = block(vec![tx("0x1", "0xAAA", "0xBBB")]);
        assert!(collect_matches(&subs, &b).is_empty());
    }
}
