//! Capacity-bounded tangle.
//!
//! [`RingTangle`] wraps any [`TransactionStore`](tangle_store::TransactionStore)
//! and keeps at most `capacity` transactions resident, the NULL transaction
//! included. Once full, each admission evicts the resident transaction with
//! the oldest issuance timestamp, ties broken by the smaller hash. The NULL
//! transaction is never tracked for eviction, so it stays resident until
//! somebody deletes it by hash.
//!
//! # Key Types
//!
//! - [`RingTangle`] -- the bounded store
//! - [`RingConfig`] -- capacity configuration (TOML-loadable)
//! - [`OrderKey`] / [`TimestampOrder`] -- the eviction order
//! - [`Admission`] -- what a single admission did
//! - [`RingStats`] -- admission and eviction counters

pub mod config;
pub mod error;
pub mod ordering;
pub mod ring;
pub mod stats;

pub use config::RingConfig;
pub use error::{RingError, RingResult};
pub use ordering::{OrderKey, TimestampOrder};
pub use ring::{Admission, RingTangle};
pub use stats::{RingStats, RingStatsSnapshot};
