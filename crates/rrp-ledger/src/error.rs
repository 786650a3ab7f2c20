use rrp_store::{BlobKey, StoreError};
use serde::Serialize;

/// A rating submission failed validation.
///
/// Carries a human-readable message naming the offending field; callers
/// map it to a client error and never retry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors produced by ledger and details operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ledger for {restaurant} still contended after {attempts} attempts")]
    Contention { restaurant: String, attempts: u32 },

    #[error("corrupt blob {key}: {reason}")]
    Corrupt { key: BlobKey, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    pub(crate) fn corrupt(key: &BlobKey, reason: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            key: key.clone(),
            reason: reason.to_string(),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
