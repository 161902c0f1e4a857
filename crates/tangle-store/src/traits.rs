use std::sync::Arc;

use tangle_types::{Address, Tag, Transaction, TxHash};

use crate::log::TransactionLog;

/// Multi-index transaction store.
///
/// All implementations must satisfy these invariants:
/// - `create_if_absent` is idempotent by hash: a second call with an equal
///   hash returns the existing log and creates nothing.
/// - `delete` is idempotent: deleting an absent hash changes nothing.
/// - After `delete` returns, the hash is absent from every index.
/// - Operations are total; no store operation fails.
pub trait TransactionStore: Send + Sync {
    /// Return the log for `transaction`, creating and indexing it if no
    /// transaction with the same hash is resident.
    ///
    /// The flag is `true` if this call created the log.
    fn create_if_absent(&self, transaction: Transaction) -> (Arc<TransactionLog>, bool);

    /// Remove a transaction from every index.
    ///
    /// Returns the removed log, or `None` if the hash was not resident.
    fn delete(&self, hash: &TxHash) -> Option<Arc<TransactionLog>>;

    /// Look up a resident transaction by hash.
    fn find_by_hash(&self, hash: &TxHash) -> Option<Arc<TransactionLog>>;

    /// All resident transactions filed under `tag`, sorted by hash.
    fn find_by_tag(&self, tag: &Tag) -> Vec<Arc<TransactionLog>>;

    /// All resident transactions filed under `address`, sorted by hash.
    fn find_by_address(&self, address: &Address) -> Vec<Arc<TransactionLog>>;

    /// Number of resident transactions, the NULL transaction included.
    fn size(&self) -> usize;

    /// Every resident log, in no particular order.
    fn logs(&self) -> Vec<Arc<TransactionLog>>;

    /// Check whether a hash is resident.
    fn contains(&self, hash: &TxHash) -> bool {
        self.find_by_hash(hash).is_some()
    }

    /// Delete by record rather than by hash.
    fn delete_transaction(&self, transaction: &Transaction) -> Option<Arc<TransactionLog>> {
        self.delete(&transaction.hash())
    }
}
