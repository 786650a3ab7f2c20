use crate::object::BlobKey;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested blob does not exist.
    #[error("blob not found: {0}")]
    NotFound(BlobKey),

    /// A conditional write found the blob in a different state.
    #[error("precondition failed for {key}: expected {expected}")]
    PreconditionFailed { key: BlobKey, expected: String },

    /// The namespace or key cannot be used by this backend.
    #[error("invalid blob key: {0}")]
    InvalidKey(String),

    /// The aggregate query could not be evaluated over the blob.
    #[error("query failed on {key}: {reason}")]
    Query { key: BlobKey, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for the expected "blob does not exist" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` when a conditional write lost a race.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
