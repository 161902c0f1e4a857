use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RingError, RingResult};

/// Configuration for a [`RingTangle`](crate::RingTangle).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Maximum number of resident transactions, the NULL transaction
    /// included.
    pub capacity: u64,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self { capacity: 10_000 }
    }
}

impl RingConfig {
    pub fn with_capacity(capacity: u64) -> Self {
        Self { capacity }
    }

    /// Reject configurations that cannot hold the NULL transaction.
    pub fn validate(&self) -> RingResult<()> {
        if self.capacity == 0 {
            return Err(RingError::InvalidCapacity(self.capacity));
        }
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> RingResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| RingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> RingResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> RingResult<String> {
        toml::to_string(self).map_err(|e| RingError::Config(e.to_string()))
    }
}
