//! Construction parameters for a pledge contract
//!
//! Loaded from JSON by deployment tooling, e.g.
//!
//! ```json
//! { "token": "0xfecec059C7a23b30291e7d154823fcf30a4E3398",
//!   "locking_period_secs": 600,
//!   "purpose": "No time" }
//! ```

use serde::{Deserialize, Serialize};
use types::ids::TokenId;

use crate::errors::ConfigError;

/// Lock duration used when a config omits one: 10 minutes.
pub const DEFAULT_LOCKING_PERIOD_SECS: u64 = 600;

fn default_locking_period_secs() -> u64 {
    DEFAULT_LOCKING_PERIOD_SECS
}

/// Immutable parameters fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PledgeConfig {
    /// Identity of the custodied token ledger
    pub token: TokenId,
    /// Seconds added to construction time to form the lock deadline
    #[serde(default = "default_locking_period_secs")]
    pub locking_period_secs: u64,
    /// Opaque description, no behavioral effect
    #[serde(default)]
    pub purpose: String,
}

impl PledgeConfig {
    pub fn new(token: TokenId, locking_period_secs: u64, purpose: impl Into<String>) -> Self {
        Self {
            token,
            locking_period_secs,
            purpose: purpose.into(),
        }
    }

    /// Parse a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
