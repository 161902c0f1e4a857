//! Record types for the bounded tangle.
//!
//! A tangle is a DAG of immutable transactions, each identified by a
//! [`TxHash`] and referencing two earlier transactions (trunk and branch).
//! Every other crate in the workspace depends on `tangle-types`.
//!
//! # Key Types
//!
//! - [`TxHash`] -- 32-byte transaction identifier, totally ordered bytewise
//! - [`Tag`] / [`Address`] -- secondary index keys carried by each transaction
//! - [`Transaction`] -- the immutable record
//! - [`TransactionBuilder`] -- content-hashing constructor for transactions

pub mod error;
pub mod hash;
pub mod transaction;

pub use error::TypeError;
pub use hash::{TxHash, HASH_LEN};
pub use transaction::{Address, Tag, Transaction, TransactionBuilder};
