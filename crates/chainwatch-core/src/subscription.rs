//! Subscription registry: the set of watched addresses.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Concurrency-safe set of subscribed addresses.
///
/// Addresses are compared exactly as received (case-sensitive). The set only
/// ever grows.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    addresses: RwLock<HashSet<String>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `address` to the set.
    ///
    /// Returns `true` if it was newly added, `false` if already present.
    pub fn subscribe(&self, address: impl Into<String>) -> bool {
        self.addresses.write().insert(address.into())
    }

    /// Returns `true` if `address` is subscribed.
    pub fn is_subscribed(&self, address: &str) -> bool {
        self.addresses.read().contains(address)
    }

    /// Number of subscribed addresses.
    pub fn len(&self) -> usize {
        self.addresses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.read().is_empty()
    }
}
