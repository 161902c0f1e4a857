//! The immutable transaction record and its secondary index keys.
//!
//! A [`Transaction`] is never mutated after construction. Stores share it
//! behind an `Arc`; indexes refer to it by [`TxHash`] only.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hash::TxHash;

/// Domain tag prepended to every transaction digest.
const TX_DOMAIN: &str = "tangle-tx-v1";

/// Free-form label used to group transactions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Create a tag from any string-like value.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Address a transaction is issued to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address from any string-like value.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An immutable, hash-identified record in the tangle.
///
/// Every transaction approves two earlier ones (`trunk` and `branch`), which
/// is what makes the tangle a DAG. The NULL transaction approves itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    hash: TxHash,
    issuance_timestamp: u64,
    tag: Tag,
    address: Address,
    trunk: TxHash,
    branch: TxHash,
    value: i64,
    message: Vec<u8>,
}

impl Transaction {
    /// The NULL transaction: null hash, timestamp zero, empty tag and
    /// address, referencing itself as trunk and branch.
    pub fn null() -> Self {
        Self {
            hash: TxHash::null(),
            issuance_timestamp: 0,
            tag: Tag::default(),
            address: Address::default(),
            trunk: TxHash::null(),
            branch: TxHash::null(),
            value: 0,
            message: Vec::new(),
        }
    }

    /// Start building a transaction whose hash is derived from its content.
    pub fn builder() -> TransactionBuilder {
        TransactionBuilder::default()
    }

    /// Assemble a transaction with a caller-supplied hash.
    ///
    /// The hash is trusted as-is. Used when replaying a feed whose hashes
    /// were computed elsewhere. Use [`Transaction::builder`] otherwise.
    pub fn from_parts(
        hash: TxHash,
        issuance_timestamp: u64,
        tag: Tag,
        address: Address,
    ) -> Self {
        Self {
            hash,
            issuance_timestamp,
            tag,
            address,
            trunk: TxHash::null(),
            branch: TxHash::null(),
            value: 0,
            message: Vec::new(),
        }
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Milliseconds since the UNIX epoch, as claimed by the issuer.
    pub fn issuance_timestamp(&self) -> u64 {
        self.issuance_timestamp
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn trunk(&self) -> TxHash {
        self.trunk
    }

    pub fn branch(&self) -> TxHash {
        self.branch
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Returns `true` for the NULL transaction.
    pub fn is_null(&self) -> bool {
        self.hash.is_null()
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} ts={} tag={:?} address={:?}",
            self.hash.short_hex(),
            self.issuance_timestamp,
            self.tag.as_str(),
            self.address.as_str(),
        )
    }
}

/// Content that feeds the transaction digest, in canonical field order.
#[derive(Serialize)]
struct HashedContent<'a> {
    issuance_timestamp: u64,
    tag: &'a Tag,
    address: &'a Address,
    trunk: &'a TxHash,
    branch: &'a TxHash,
    value: i64,
    message: &'a [u8],
}

/// Builder for [`Transaction`] that derives the hash from the content.
#[derive(Clone, Debug, Default)]
pub struct TransactionBuilder {
    issuance_timestamp: u64,
    tag: Tag,
    address: Address,
    trunk: TxHash,
    branch: TxHash,
    value: i64,
    message: Vec<u8>,
}

impl TransactionBuilder {
    pub fn issuance_timestamp(mut self, ms: u64) -> Self {
        self.issuance_timestamp = ms;
        self
    }

    pub fn tag(mut self, tag: impl Into<Tag>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn address(mut self, address: impl Into<Address>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the two approved transactions.
    pub fn approves(mut self, trunk: TxHash, branch: TxHash) -> Self {
        self.trunk = trunk;
        self.branch = branch;
        self
    }

    pub fn value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    pub fn message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.message = message.into();
        self
    }

    /// Compute the domain-separated BLAKE3 digest and build the transaction.
    pub fn build(self) -> Result<Transaction, TypeError> {
        let content = HashedContent {
            issuance_timestamp: self.issuance_timestamp,
            tag: &self.tag,
            address: &self.address,
            trunk: &self.trunk,
            branch: &self.branch,
            value: self.value,
            message: &self.message,
        };
        let encoded =
            bincode::serialize(&content).map_err(|e| TypeError::Serialization(e.to_string()))?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(TX_DOMAIN.as_bytes());
        hasher.update(b":");
        hasher.update(&encoded);
        let hash = TxHash::from_hash(*hasher.finalize().as_bytes());

        Ok(self.build_with_hash(hash))
    }

    /// Build the transaction under a caller-supplied hash, keeping every
    /// field set on the builder. The hash is trusted as-is.
    pub fn build_with_hash(self, hash: TxHash) -> Transaction {
        Transaction {
            hash,
            issuance_timestamp: self.issuance_timestamp,
            tag: self.tag,
            address: self.address,
            trunk: self.trunk,
            branch: self.branch,
            value: self.value,
            message: self.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransactionBuilder {
        Transaction::builder()
            .issuance_timestamp(1_700_000_000_000)
            .tag("PAYMENT")
            .address("ADDR9")
            .message(b"hello".to_vec())
    }

    #[test]
    fn build_is_deterministic() {
        let a = sample().build().unwrap();
        let b = sample().build().unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a, b);
    }

    #[test]
    fn content_changes_hash() {
        let a = sample().build().unwrap();
        let b = sample().issuance_timestamp(1).build().unwrap();
        let c = sample().tag("OTHER").build().unwrap();
        let d = sample()
            .approves(TxHash::from_hash([1; 32]), TxHash::null())
            .build()
            .unwrap();
        assert_ne!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
        assert_ne!(a.hash(), d.hash());
    }

    #[test]
    fn built_hash_is_never_null() {
        let tx = Transaction::builder().build().unwrap();
        assert!(!tx.is_null());
    }

    #[test]
    fn null_transaction_shape() {
        let null = Transaction::null();
        assert!(null.is_null());
        assert_eq!(null.issuance_timestamp(), 0);
        assert!(null.tag().is_empty());
        assert!(null.address().is_empty());
        assert_eq!(null.trunk(), TxHash::null());
        assert_eq!(null.branch(), TxHash::null());
    }

    #[test]
    fn from_parts_keeps_supplied_hash() {
        let hash = TxHash::from_hash([0xaa; 32]);
        let tx = Transaction::from_parts(hash, 5, Tag::new("T"), Address::new("A"));
        assert_eq!(tx.hash(), hash);
        assert_eq!(tx.issuance_timestamp(), 5);
        assert_eq!(tx.tag().as_str(), "T");
        assert_eq!(tx.address().as_str(), "A");
    }

    #[test]
    fn build_with_hash_keeps_payload() {
        let hash = TxHash::from_hash([0xcd; 32]);
        let tx = sample().value(-7).build_with_hash(hash);
        assert_eq!(tx.hash(), hash);
        assert_eq!(tx.value(), -7);
        assert_eq!(tx.message(), b"hello");
        assert_eq!(tx.tag().as_str(), "PAYMENT");
    }

    #[test]
    fn summary_contains_key_info() {
        let tx = sample().build().unwrap();
        let summary = tx.summary();
        assert!(summary.contains(&tx.hash().short_hex()));
        assert!(summary.contains("PAYMENT"));
    }

    #[test]
    fn serde_roundtrip() {
        let tx = sample().build().unwrap();
        let json = serde_json::to_string(&tx).unwrap();
        let parsed: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, parsed);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn distinct_timestamps_give_distinct_hashes(a in any::<u64>(), b in any::<u64>()) {
                prop_assume!(a != b);
                let x = Transaction::builder().issuance_timestamp(a).build().unwrap();
                let y = Transaction::builder().issuance_timestamp(b).build().unwrap();
                prop_assert_ne!(x.hash(), y.hash());
            }
        }
    }
}
