//! Multi-index transaction storage for the tangle.
//!
//! The store keeps every transaction it is given, indexed three ways:
//!
//! - by hash (primary): `TxHash -> TransactionLog`
//! - by tag: `Tag -> {TxHash}`
//! - by address: `Address -> {TxHash}`
//!
//! All backends implement the [`TransactionStore`] trait:
//!
//! - [`Tangle`] -- unbounded, `DashMap`-backed store
//!
//! # Design Rules
//!
//! 1. Transactions are immutable; the store only adds and removes them.
//! 2. Insertion is idempotent by hash: the first record for a hash wins.
//! 3. Deletion is idempotent: removing an absent hash is a no-op.
//! 4. A hash is in a secondary set if and only if it is in the primary index.
//! 5. Every store is bootstrapped with the NULL transaction.

pub mod log;
pub mod memory;
pub mod traits;

pub use log::{add_to_set_map, remove_from_set_map, SetMap, TransactionLog};
pub use memory::Tangle;
pub use traits::TransactionStore;
