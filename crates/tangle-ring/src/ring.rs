//! The bounded tangle and its admission/eviction policy.
//!
//! [`RingTangle`] decorates a [`TransactionStore`]. Every admission and
//! every deletion runs under one per-instance mutex that also guards the
//! [`TimestampOrder`], so "check capacity, evict, insert" is a single
//! critical section. Room is made before the newcomer becomes resident.
//! Lookups bypass the mutex and go straight to the store's concurrent
//! indexes.
//!
//! `size()` does not ask the store: a sharded count taken while an eviction
//! and an insertion land in different shards can see both. The resident
//! count is instead published at the end of each critical section, so
//! readers only ever observe a settled value.
//!
//! # Invariants
//!
//! - `size() <= capacity` for every reader, at every moment.
//! - The NULL transaction is never tracked in the eviction order.
//! - A non-NULL hash is tracked if and only if it is resident.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use tangle_store::{Tangle, TransactionLog, TransactionStore};
use tangle_types::{Address, Tag, Transaction, TxHash};

use crate::config::RingConfig;
use crate::error::{RingError, RingResult};
use crate::ordering::{OrderKey, TimestampOrder};
use crate::stats::{RingStats, RingStatsSnapshot};

/// Upper bound on how much of the capacity is pre-allocated up front.
const MAX_PREALLOCATED: u64 = 1 << 16;

/// What a single admission did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The transaction became resident. `evicted` names the transaction
    /// removed to make room for it, if any.
    Inserted { evicted: Option<TxHash> },
    /// A transaction with the same hash was already resident. Nothing changed.
    AlreadyResident,
    /// The tangle was full and the newcomer was older than every evictable
    /// resident, so it was evicted on arrival and never became resident.
    EvictedOnArrival,
}

impl Admission {
    /// Hash of the transaction this admission evicted, given the hash of
    /// the transaction being admitted.
    pub fn evicted_hash(&self, admitted: TxHash) -> Option<TxHash> {
        match self {
            Self::Inserted { evicted } => *evicted,
            Self::AlreadyResident => None,
            Self::EvictedOnArrival => Some(admitted),
        }
    }
}

/// A tangle that keeps at most `capacity` transactions resident.
pub struct RingTangle<S = Tangle> {
    store: S,
    ordering: Mutex<TimestampOrder>,
    capacity: u64,
    sentinel: TxHash,
    /// Resident count as of the last completed critical section.
    resident: AtomicUsize,
    stats: RingStats,
}

impl RingTangle<Tangle> {
    /// Build a fresh unbounded tangle and wrap it.
    pub fn with_config(config: RingConfig) -> RingResult<Self> {
        let hint = usize::try_from(config.capacity.min(MAX_PREALLOCATED)).unwrap_or(0);
        Self::new(Tangle::with_capacity(hint), config)
    }
}

impl<S: TransactionStore> RingTangle<S> {
    /// Wrap a store that already holds the NULL transaction.
    ///
    /// Every other resident transaction is adopted into the eviction order,
    /// then the oldest ones are evicted until the store fits `capacity`.
    pub fn new(store: S, config: RingConfig) -> RingResult<Self> {
        config.validate()?;
        let sentinel = TxHash::null();
        if !store.contains(&sentinel) {
            return Err(RingError::MissingSentinel(sentinel));
        }

        let mut ordering = TimestampOrder::new();
        for log in store.logs() {
            if log.hash() != sentinel {
                ordering.insert(OrderKey::of(log.transaction()));
            }
        }
        let adopted = ordering.len();

        let ring = Self {
            store,
            ordering: Mutex::new(TimestampOrder::new()),
            capacity: config.capacity,
            sentinel,
            resident: AtomicUsize::new(0),
            stats: RingStats::default(),
        };

        let mut trimmed = 0usize;
        while ring.exceeds_capacity(ordering.len()) {
            let Some(oldest) = ordering.pop_first() else {
                break;
            };
            if ring.remove_locked(&mut ordering, &oldest.hash).is_some() {
                ring.stats.record_evicted();
                trimmed += 1;
            }
        }
        *ring.ordering.lock() = ordering;
        ring.publish_size();

        info!(
            capacity = ring.capacity,
            adopted,
            trimmed,
            "bounded tangle ready"
        );
        Ok(ring)
    }

    /// Admit a transaction, evicting the oldest resident if the tangle is
    /// full. Returns the log for the transaction's hash.
    ///
    /// If the newcomer itself is the oldest, the returned log is detached:
    /// it is not resident in the store.
    pub fn admit(&self, transaction: Transaction) -> Arc<TransactionLog> {
        self.admit_with_outcome(transaction).0
    }

    /// Like [`RingTangle::admit`], also reporting what the admission did.
    pub fn admit_with_outcome(&self, transaction: Transaction) -> (Arc<TransactionLog>, Admission) {
        let hash = transaction.hash();
        let mut ordering = self.ordering.lock();

        if let Some(existing) = self.store.find_by_hash(&hash) {
            self.stats.record_duplicate();
            return (existing, Admission::AlreadyResident);
        }

        // The NULL transaction only comes back after an explicit delete. It
        // takes its reserved slot and is never tracked.
        if hash == self.sentinel {
            let (log, _) = self.store.create_if_absent(transaction);
            self.stats.record_admitted();
            self.publish_size();
            return (log, Admission::Inserted { evicted: None });
        }

        let key = OrderKey::of(&transaction);
        let mut evicted = None;
        if self.exceeds_capacity(ordering.len() + 1) {
            match ordering.first().copied() {
                Some(oldest) if oldest < key => {
                    ordering.pop_first();
                    if self.remove_locked(&mut ordering, &oldest.hash).is_some() {
                        self.stats.record_evicted();
                        debug!(
                            tx = %oldest.hash.short_hex(),
                            ts = oldest.issuance_timestamp,
                            "evicted oldest transaction"
                        );
                        evicted = Some(oldest.hash);
                    } else {
                        warn!(tx = %oldest.hash.short_hex(), "tracked transaction was not resident");
                    }
                }
                _ => {
                    self.stats.record_evicted();
                    debug!(tx = %hash.short_hex(), ts = key.issuance_timestamp, "evicted on arrival");
                    return (
                        Arc::new(TransactionLog::new(transaction)),
                        Admission::EvictedOnArrival,
                    );
                }
            }
        }

        let (log, created) = self.store.create_if_absent(transaction);
        if !created {
            self.stats.record_duplicate();
            self.publish_size();
            return (log, Admission::AlreadyResident);
        }
        ordering.insert(key);
        self.stats.record_admitted();
        self.publish_size();
        self.check_bound();

        (log, Admission::Inserted { evicted })
    }

    /// Remove a transaction from every index and from the eviction order.
    ///
    /// Deleting an absent hash is a no-op. The NULL transaction can be
    /// deleted this way; nothing else ever removes it.
    pub fn delete(&self, hash: &TxHash) -> Option<Arc<TransactionLog>> {
        let mut ordering = self.ordering.lock();
        let removed = self.remove_locked(&mut ordering, hash)?;
        self.stats.record_deleted();
        self.publish_size();
        Some(removed)
    }

    /// Maximum resident count, the NULL transaction included.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Hash of the transaction that is never evicted.
    pub fn sentinel_hash(&self) -> TxHash {
        self.sentinel
    }

    /// Number of transactions in the eviction order.
    pub fn tracked(&self) -> usize {
        self.ordering.lock().len()
    }

    /// The next transaction to be evicted.
    pub fn oldest(&self) -> Option<OrderKey> {
        self.ordering.lock().first().copied()
    }

    /// Every tracked transaction, oldest first.
    pub fn tracked_keys(&self) -> Vec<OrderKey> {
        self.ordering.lock().iter().copied().collect()
    }

    pub fn stats(&self) -> RingStatsSnapshot {
        self.stats.snapshot()
    }

    /// Unwrap the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// The single removal path shared by eviction and deletion. The caller
    /// holds the ordering lock.
    fn remove_locked(
        &self,
        ordering: &mut TimestampOrder,
        hash: &TxHash,
    ) -> Option<Arc<TransactionLog>> {
        let log = self.store.delete(hash)?;
        ordering.remove(&OrderKey::of(log.transaction()));
        Some(log)
    }

    /// Whether `tracked` transactions plus the NULL transaction overflow.
    fn exceeds_capacity(&self, tracked: usize) -> bool {
        tracked as u64 + 1 > self.capacity
    }

    /// Publish the store's count. The caller holds the ordering lock, so
    /// no mutation is in flight and the sharded count is exact.
    fn publish_size(&self) {
        self.resident.store(self.store.size(), Ordering::Release);
    }

    fn check_bound(&self) {
        let size = self.resident.load(Ordering::Acquire) as u64;
        debug_assert!(
            size <= self.capacity,
            "resident count {size} exceeds capacity {}",
            self.capacity
        );
        if size > self.capacity {
            error!(size, capacity = self.capacity, "resident count exceeds capacity");
        }
    }
}

impl<S: TransactionStore> TransactionStore for RingTangle<S> {
    /// Admits through the eviction policy. The flag is `true` only if the
    /// transaction became resident.
    fn create_if_absent(&self, transaction: Transaction) -> (Arc<TransactionLog>, bool) {
        let (log, outcome) = self.admit_with_outcome(transaction);
        (log, matches!(outcome, Admission::Inserted { .. }))
    }

    fn delete(&self, hash: &TxHash) -> Option<Arc<TransactionLog>> {
        RingTangle::delete(self, hash)
    }

    fn find_by_hash(&self, hash: &TxHash) -> Option<Arc<TransactionLog>> {
        self.store.find_by_hash(hash)
    }

    fn find_by_tag(&self, tag: &Tag) -> Vec<Arc<TransactionLog>> {
        self.store.find_by_tag(tag)
    }

    fn find_by_address(&self, address: &Address) -> Vec<Arc<TransactionLog>> {
        self.store.find_by_address(address)
    }

    /// The count published by the last completed admission or deletion.
    fn size(&self) -> usize {
        self.resident.load(Ordering::Acquire)
    }

    fn logs(&self) -> Vec<Arc<TransactionLog>> {
        self.store.logs()
    }
}

impl<S: TransactionStore> std::fmt::Debug for RingTangle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingTangle")
            .field("capacity", &self.capacity)
            .field("resident", &self.store.size())
            .field("tracked", &self.tracked())
            .finish()
    }
}
