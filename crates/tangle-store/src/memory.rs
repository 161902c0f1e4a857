use std::hash::Hash;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use tangle_types::{Address, Tag, Transaction, TxHash};

use crate::log::{add_to_set_map, remove_from_set_map, SetMap, TransactionLog};
use crate::traits::TransactionStore;

/// Unbounded, in-memory tangle.
///
/// Three `DashMap` indexes share the work: the primary hash index owns the
/// logs, the tag and address indexes hold hashes only. Secondary indexes
/// are updated while the primary shard for the hash is locked, so a create
/// and a delete of the same hash never interleave.
///
/// Lock order is always primary, then secondary.
pub struct Tangle {
    by_hash: DashMap<TxHash, Arc<TransactionLog>>,
    by_tag: SetMap<Tag>,
    by_address: SetMap<Address>,
}

impl Tangle {
    /// Create a tangle holding only the NULL transaction.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Like [`Tangle::new`], pre-sizing the primary index.
    pub fn with_capacity(capacity: usize) -> Self {
        let tangle = Self {
            by_hash: DashMap::with_capacity(capacity),
            by_tag: DashMap::new(),
            by_address: DashMap::new(),
        };
        tangle.create_if_absent(Transaction::null());
        tangle
    }

    /// Number of distinct tags currently indexed.
    pub fn tag_count(&self) -> usize {
        self.by_tag.len()
    }

    /// Number of distinct addresses currently indexed.
    pub fn address_count(&self) -> usize {
        self.by_address.len()
    }

    /// Sorted list of every resident hash.
    pub fn all_hashes(&self) -> Vec<TxHash> {
        let mut hashes: Vec<TxHash> = self.by_hash.iter().map(|e| *e.key()).collect();
        hashes.sort();
        hashes
    }

    fn resolve(&self, hashes: Vec<TxHash>) -> Vec<Arc<TransactionLog>> {
        let mut logs: Vec<Arc<TransactionLog>> = hashes
            .iter()
            .filter_map(|h| self.by_hash.get(h).map(|log| Arc::clone(log.value())))
            .collect();
        logs.sort_by_key(|log| log.hash());
        logs
    }

    fn hashes_under<K: Eq + Hash>(map: &SetMap<K>, key: &K) -> Vec<TxHash> {
        map.get(key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for Tangle {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore for Tangle {
    fn create_if_absent(&self, transaction: Transaction) -> (Arc<TransactionLog>, bool) {
        let hash = transaction.hash();
        match self.by_hash.entry(hash) {
            Entry::Occupied(existing) => (Arc::clone(existing.get()), false),
            Entry::Vacant(slot) => {
                add_to_set_map(&self.by_tag, transaction.tag().clone(), hash);
                add_to_set_map(&self.by_address, transaction.address().clone(), hash);
                let log = Arc::new(TransactionLog::new(transaction));
                slot.insert(Arc::clone(&log));
                debug!(tx = %hash.short_hex(), "indexed transaction");
                (log, true)
            }
        }
    }

    fn delete(&self, hash: &TxHash) -> Option<Arc<TransactionLog>> {
        let (_, log) = self.by_hash.remove_if(hash, |_, log| {
            let tx = log.transaction();
            remove_from_set_map(&self.by_tag, tx.tag(), hash);
            remove_from_set_map(&self.by_address, tx.address(), hash);
            true
        })?;
        debug!(tx = %hash.short_hex(), "deleted transaction");
        Some(log)
    }

    fn find_by_hash(&self, hash: &TxHash) -> Option<Arc<TransactionLog>> {
        self.by_hash.get(hash).map(|log| Arc::clone(log.value()))
    }

    fn find_by_tag(&self, tag: &Tag) -> Vec<Arc<TransactionLog>> {
        let hashes = Self::hashes_under(&self.by_tag, tag);
        self.resolve(hashes)
    }

    fn find_by_address(&self, address: &Address) -> Vec<Arc<TransactionLog>> {
        let hashes = Self::hashes_under(&self.by_address, address);
        self.resolve(hashes)
    }

    fn size(&self) -> usize {
        self.by_hash.len()
    }

    fn logs(&self) -> Vec<Arc<TransactionLog>> {
        self.by_hash.iter().map(|e| Arc::clone(e.value())).collect()
    }
}

impl std::fmt::Debug for Tangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tangle")
            .field("transactions", &self.by_hash.len())
            .field("tags", &self.by_tag.len())
            .field("addresses", &self.by_address.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tx(byte: u8, ts: u64, tag: &str, address: &str) -> Transaction {
        Transaction::from_parts(
            TxHash::from_hash([byte; 32]),
            ts,
            Tag::new(tag),
            Address::new(address),
        )
    }

    // -----------------------------------------------------------------------
    // Bootstrap
    // -----------------------------------------------------------------------

    #[test]
    fn new_tangle_holds_null_transaction() {
        let tangle = Tangle::new();
        assert_eq!(tangle.size(), 1);
        let null = tangle.find_by_hash(&TxHash::null()).expect("NULL resident");
        assert!(null.transaction().is_null());
        assert_eq!(tangle.find_by_tag(&Tag::default()).len(), 1);
        assert_eq!(tangle.find_by_address(&Address::default()).len(), 1);
    }

    // -----------------------------------------------------------------------
    // Insertion
    // -----------------------------------------------------------------------

    #[test]
    fn create_indexes_all_three_ways() {
        let tangle = Tangle::new();
        let tx = make_tx(1, 10, "TAG", "ADDR");
        let (log, created) = tangle.create_if_absent(tx.clone());
        assert!(created);
        assert_eq!(log.transaction().as_ref(), &tx);

        assert!(tangle.contains(&tx.hash()));
        assert_eq!(tangle.find_by_tag(&Tag::new("TAG"))[0].hash(), tx.hash());
        assert_eq!(tangle.find_by_address(&Address::new("ADDR"))[0].hash(), tx.hash());
        assert_eq!(tangle.size(), 2);
    }

    #[test]
    fn create_is_idempotent_by_hash() {
        let tangle = Tangle::new();
        let (first, created) = tangle.create_if_absent(make_tx(1, 10, "A", "X"));
        assert!(created);
        // Same hash, different content: the resident record wins.
        let (second, created) = tangle.create_if_absent(make_tx(1, 99, "B", "Y"));
        assert!(!created);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.transaction().issuance_timestamp(), 10);
        assert!(tangle.find_by_tag(&Tag::new("B")).is_empty());
        assert_eq!(tangle.size(), 2);
    }

    #[test]
    fn null_collision_is_same_record() {
        let tangle = Tangle::new();
        let (_, created) = tangle.create_if_absent(make_tx(0, 500, "X", "Y"));
        assert!(!created);
        assert_eq!(tangle.size(), 1);
    }

    #[test]
    fn lookups_are_sorted_by_hash() {
        let tangle = Tangle::new();
        for byte in [9u8, 3, 7] {
            tangle.create_if_absent(make_tx(byte, 1, "T", "A"));
        }
        let hashes: Vec<TxHash> = tangle
            .find_by_tag(&Tag::new("T"))
            .iter()
            .map(|l| l.hash())
            .collect();
        assert_eq!(
            hashes,
            vec![
                TxHash::from_hash([3; 32]),
                TxHash::from_hash([7; 32]),
                TxHash::from_hash([9; 32]),
            ]
        );
    }

    // -----------------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------------

    #[test]
    fn delete_strips_every_index() {
        let tangle = Tangle::new();
        let tx = make_tx(1, 10, "TAG", "ADDR");
        tangle.create_if_absent(tx.clone());

        let removed = tangle.delete(&tx.hash()).expect("was resident");
        assert_eq!(removed.hash(), tx.hash());
        assert!(!tangle.contains(&tx.hash()));
        assert!(tangle.find_by_tag(&Tag::new("TAG")).is_empty());
        assert!(tangle.find_by_address(&Address::new("ADDR")).is_empty());
        // Empty sets are dropped; only the NULL transaction's keys remain.
        assert_eq!(tangle.tag_count(), 1);
        assert_eq!(tangle.address_count(), 1);
    }

    #[test]
    fn delete_keeps_siblings_under_shared_keys() {
        let tangle = Tangle::new();
        tangle.create_if_absent(make_tx(1, 10, "TAG", "ADDR"));
        tangle.create_if_absent(make_tx(2, 11, "TAG", "ADDR"));
        tangle.delete(&TxHash::from_hash([1; 32]));
        assert_eq!(tangle.find_by_tag(&Tag::new("TAG")).len(), 1);
        assert_eq!(tangle.find_by_address(&Address::new("ADDR")).len(), 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let tangle = Tangle::new();
        let tx = make_tx(1, 10, "T", "A");
        tangle.create_if_absent(tx.clone());
        assert!(tangle.delete_transaction(&tx).is_some());
        assert!(tangle.delete_transaction(&tx).is_none());
        assert!(tangle.delete(&TxHash::from_hash([42; 32])).is_none());
        assert_eq!(tangle.size(), 1);
    }

    #[test]
    fn reinsert_after_delete_is_fresh() {
        let tangle = Tangle::new();
        let (old, _) = tangle.create_if_absent(make_tx(1, 10, "T", "A"));
        tangle.delete(&old.hash());
        let (new, created) = tangle.create_if_absent(make_tx(1, 20, "U", "B"));
        assert!(created);
        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(new.transaction().issuance_timestamp(), 20);
        assert!(tangle.find_by_tag(&Tag::new("T")).is_empty());
        assert_eq!(tangle.find_by_tag(&Tag::new("U")).len(), 1);
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_create_and_delete_keep_indexes_consistent() {
        use std::thread;

        let tangle = Arc::new(Tangle::new());
        let handles: Vec<_> = (0..8u8)
            .map(|t| {
                let tangle = Arc::clone(&tangle);
                thread::spawn(move || {
                    for i in 0..200u8 {
                        let byte = i % 16 + 1;
                        let tx = make_tx(byte, u64::from(i), "T", &format!("A{byte}"));
                        if (i + t) % 3 == 0 {
                            tangle.delete(&tx.hash());
                        } else {
                            tangle.create_if_absent(tx);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let tagged = tangle.find_by_tag(&Tag::new("T")).len();
        assert_eq!(tagged + 1, tangle.size());
        for hash in tangle.all_hashes() {
            let log = tangle.find_by_hash(&hash).unwrap();
            let tx = log.transaction();
            assert!(tangle
                .find_by_address(tx.address())
                .iter()
                .any(|l| l.hash() == hash));
        }
    }
}
