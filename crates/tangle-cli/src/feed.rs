//! JSON-lines transaction feeds.
//!
//! Each non-blank line is either a transaction
//! (`{"timestamp": 5, "tag": "T", "address": "A"}`, optionally with a
//! 64-hex `hash`) or a deletion (`{"delete": "<64 hex>"}`). Lines starting
//! with `#` are comments.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use tangle_types::{Address, Tag, Transaction, TxHash, TypeError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedLine {
    Delete { delete: String },
    Admit(FeedRecord),
}

#[derive(Debug, Deserialize)]
struct FeedRecord {
    /// Trusted as-is when present; otherwise derived from the content.
    hash: Option<String>,
    timestamp: u64,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    value: i64,
    message: Option<String>,
}

impl FeedRecord {
    fn into_transaction(self) -> Result<Transaction, TypeError> {
        let builder = Transaction::builder()
            .issuance_timestamp(self.timestamp)
            .tag(Tag::new(self.tag))
            .address(Address::new(self.address))
            .value(self.value)
            .message(self.message.unwrap_or_default().into_bytes());
        match self.hash {
            Some(hex) => Ok(builder.build_with_hash(TxHash::from_hex(&hex)?)),
            None => builder.build(),
        }
    }
}

/// One step of a replay.
#[derive(Debug, PartialEq, Eq)]
pub enum FeedOp {
    Admit(Transaction),
    Delete(TxHash),
}

/// Parse a single feed line. Blank lines and comments yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<FeedOp>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let op = match serde_json::from_str::<FeedLine>(line)? {
        FeedLine::Delete { delete } => FeedOp::Delete(TxHash::from_hex(&delete)?),
        FeedLine::Admit(record) => FeedOp::Admit(record.into_transaction()?),
    };
    Ok(Some(op))
}

/// Read every operation from a feed file.
pub fn read_feed(path: &Path) -> anyhow::Result<Vec<FeedOp>> {
    let file = File::open(path).with_context(|| format!("opening feed {}", path.display()))?;
    let mut ops = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        if let Some(op) = parse_line(&line).with_context(|| format!("line {}", n + 1))? {
            ops.push(op);
        }
    }
    Ok(ops)
}
