use serde::{Deserialize, Serialize};

/// Tuning for ledger writes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Total attempts (first try included) for an append whose conditional
    /// write keeps losing to concurrent writers.
    pub max_append_attempts: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_append_attempts: 5,
        }
    }
}
