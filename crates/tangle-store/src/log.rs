//! Per-transaction log entries and the set-valued index helpers.

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use tangle_types::{Transaction, TxHash};

/// A secondary index mapping a key to the hashes filed under it.
pub type SetMap<K> = DashMap<K, HashSet<TxHash>>;

/// The store's entry for one resident transaction.
///
/// Handed out as `Arc<TransactionLog>`. The transaction itself never
/// changes; the sender set grows as more neighbors deliver the same
/// transaction.
#[derive(Debug)]
pub struct TransactionLog {
    transaction: Arc<Transaction>,
    senders: RwLock<BTreeSet<String>>,
}

impl TransactionLog {
    /// Wrap a transaction in a fresh log with no recorded senders.
    pub fn new(transaction: Transaction) -> Self {
        Self {
            transaction: Arc::new(transaction),
            senders: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn transaction(&self) -> &Arc<Transaction> {
        &self.transaction
    }

    pub fn hash(&self) -> TxHash {
        self.transaction.hash()
    }

    /// Record that `sender` delivered this transaction. Returns `true` if
    /// the sender was not already known.
    pub fn add_sender(&self, sender: impl Into<String>) -> bool {
        self.senders.write().insert(sender.into())
    }

    pub fn was_sent_by(&self, sender: &str) -> bool {
        self.senders.read().contains(sender)
    }

    /// All known senders, sorted.
    pub fn senders(&self) -> Vec<String> {
        self.senders.read().iter().cloned().collect()
    }
}

/// File `hash` under `key`, creating the set if needed.
pub fn add_to_set_map<K>(map: &SetMap<K>, key: K, hash: TxHash)
where
    K: Eq + Hash,
{
    map.entry(key).or_default().insert(hash);
}

/// Remove `hash` from the set under `key`, dropping the set once empty.
///
/// A missing key or a hash not in the set is a no-op.
pub fn remove_from_set_map<K>(map: &SetMap<K>, key: &K, hash: &TxHash)
where
    K: Eq + Hash,
{
    map.remove_if_mut(key, |_, set| {
        set.remove(hash);
        set.is_empty()
    });
}
