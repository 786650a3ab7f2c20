use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(#[from] rrp_ledger::ValidationError),

    #[error("ledger error: {0}")]
    Ledger(#[from] rrp_ledger::LedgerError),

    #[error("store error: {0}")]
    Store(#[from] rrp_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    /// `true` when the caller sent something invalid and should fix it
    /// rather than retry.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
