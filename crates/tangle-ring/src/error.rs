//! Error types for the bounded tangle.
//!
//! Admission and deletion never fail. Errors only arise while building a
//! [`RingTangle`](crate::RingTangle) or loading its configuration.

use tangle_types::TxHash;

/// Errors from constructing or configuring a bounded tangle.
#[derive(Debug, thiserror::Error)]
pub enum RingError {
    /// Capacity must leave room for the NULL transaction.
    #[error("invalid capacity {0}: must be at least 1")]
    InvalidCapacity(u64),

    /// The wrapped store does not hold the NULL transaction.
    #[error("store is missing the NULL transaction {0:?}")]
    MissingSentinel(TxHash),

    /// The configuration could not be parsed or rendered.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for bounded tangle operations.
pub type RingResult<T> = Result<T, RingError>;
