use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Running counters for a [`RingTangle`](crate::RingTangle).
#[derive(Debug, Default)]
pub struct RingStats {
    admitted: AtomicU64,
    duplicates: AtomicU64,
    evicted: AtomicU64,
    deleted: AtomicU64,
}

/// Point-in-time copy of [`RingStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RingStatsSnapshot {
    /// Admissions that made a new transaction resident.
    pub admitted: u64,
    /// Admissions of a hash that was already resident.
    pub duplicates: u64,
    /// Transactions removed to stay within capacity, including newcomers
    /// rejected on arrival.
    pub evicted: u64,
    /// Caller-initiated deletions that removed a resident transaction.
    pub deleted: u64,
}

impl RingStats {
    pub(crate) fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evicted(&self) {
        self.evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deleted(&self) {
        self.deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RingStatsSnapshot {
        RingStatsSnapshot {
            admitted: self.admitted.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
        }
    }
}
