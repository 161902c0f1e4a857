//! The eviction order over resident transactions.
//!
//! [`OrderKey`] orders by issuance timestamp, then by hash. Hashes are
//! unique among residents, so no two keys compare equal and the minimum is
//! always a single transaction. Replaying the same admissions therefore
//! evicts the same transactions.

use std::collections::BTreeSet;

use serde::Serialize;

use tangle_types::{Transaction, TxHash};

/// Position of a transaction in the eviction order.
///
/// Field order matters: the derived `Ord` compares `issuance_timestamp`
/// first and falls back to `hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OrderKey {
    pub issuance_timestamp: u64,
    pub hash: TxHash,
}

impl OrderKey {
    pub fn new(issuance_timestamp: u64, hash: TxHash) -> Self {
        Self {
            issuance_timestamp,
            hash,
        }
    }

    pub fn of(transaction: &Transaction) -> Self {
        Self::new(transaction.issuance_timestamp(), transaction.hash())
    }
}

/// Resident transactions sorted oldest first.
///
/// Holds keys only; the records themselves stay in the store. Not
/// synchronized: the owner guards it.
#[derive(Clone, Debug, Default)]
pub struct TimestampOrder {
    keys: BTreeSet<OrderKey>,
}

impl TimestampOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns `true` if the key was not already present.
    pub fn insert(&mut self, key: OrderKey) -> bool {
        self.keys.insert(key)
    }

    /// Returns `true` if the key was present.
    pub fn remove(&mut self, key: &OrderKey) -> bool {
        self.keys.remove(key)
    }

    pub fn contains(&self, key: &OrderKey) -> bool {
        self.keys.contains(key)
    }

    /// The oldest key.
    pub fn first(&self) -> Option<&OrderKey> {
        self.keys.first()
    }

    /// Remove and return the oldest key.
    pub fn pop_first(&mut self) -> Option<OrderKey> {
        self.keys.pop_first()
    }

    /// All keys, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &OrderKey> {
        self.keys.iter()
    }
}
