use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of bytes in a transaction digest.
pub const HASH_LEN: usize = 32;

/// Identifier of a transaction in the tangle.
///
/// Two transactions with the same `TxHash` are the same transaction as far
/// as every index is concerned. The derived `Ord` compares the raw bytes
/// lexicographically; the eviction order falls back to it when issuance
/// timestamps collide, so it must not be replaced by a custom impl.
///
/// The all-zero value is reserved for the NULL transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxHash([u8; HASH_LEN]);

impl TxHash {
    pub const fn from_hash(digest: [u8; HASH_LEN]) -> Self {
        Self(digest)
    }

    /// Hash of the NULL transaction.
    pub const fn null() -> Self {
        Self([0u8; HASH_LEN])
    }

    pub fn is_null(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Leading four bytes in hex, for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse the 64-character form produced by [`TxHash::to_hex`].
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        s.parse()
    }
}

impl FromStr for TxHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HASH_LEN * 2 {
            return Err(TypeError::InvalidLength {
                expected: HASH_LEN,
                actual: s.len() / 2,
            });
        }
        let mut digest = [0u8; HASH_LEN];
        hex::decode_to_slice(s, &mut digest).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(digest))
    }
}

impl Default for TxHash {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.short_hex())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; HASH_LEN]> for TxHash {
    fn from(digest: [u8; HASH_LEN]) -> Self {
        Self(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_first(first: u8, rest: u8) -> TxHash {
        let mut digest = [rest; HASH_LEN];
        digest[0] = first;
        TxHash::from_hash(digest)
    }

    #[test]
    fn null_hash_identifies_the_null_transaction() {
        assert!(TxHash::default().is_null());
        assert!(!with_first(0, 1).is_null());
    }

    #[test]
    fn tie_break_compares_leading_bytes_first() {
        // A lower leading byte wins no matter what follows.
        assert!(with_first(0xaa, 0xff) < with_first(0xbb, 0x00));
        assert!(TxHash::null() < with_first(0, 1));
    }

    #[test]
    fn parses_what_it_prints() {
        let hash = with_first(0x10, 0x5a);
        assert_eq!(hash.to_string().parse::<TxHash>().unwrap(), hash);
        assert_eq!(TxHash::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn feed_hashes_must_be_full_length() {
        assert_eq!(
            TxHash::from_hex("abcd").unwrap_err(),
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn feed_hashes_must_be_hex() {
        let bad = "zz".repeat(HASH_LEN);
        assert!(matches!(TxHash::from_hex(&bad), Err(TypeError::InvalidHex(_))));
    }

    #[test]
    fn log_form_is_short() {
        let hash = with_first(0xde, 0xad);
        assert_eq!(hash.short_hex(), "deadadad");
        assert_eq!(format!("{hash:?}"), "TxHash(deadadad)");
    }

    #[test]
    fn json_keeps_identity() {
        let hash = with_first(7, 9);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(serde_json::from_str::<TxHash>(&json).unwrap(), hash);
    }
}
