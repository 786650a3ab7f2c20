//! Orchestration layer for the Restaurant Rating Pool.
//!
//! Sequences the core operations into the two request flows the pool
//! serves, and is the main entry point for applications embedding RRP:
//!
//! - submission: validate → append rating → ensure details → alert
//! - query: average and details fetched concurrently, then merged

pub mod config;
pub mod error;
pub mod notify;
pub mod pool;
pub mod query;
pub mod submit;

pub use config::{PoolConfig, StoreConfig};
pub use error::{ServiceError, ServiceResult};
pub use notify::{
    BelowAverageAlert, LogNotifier, NoopNotifier, NotificationConfig, Notifier, NotifyError,
    RecordingNotifier,
};
pub use pool::RatingPool;
pub use query::QueryService;
pub use submit::{SubmissionOutcome, SubmissionService};

// Re-export key types
pub use rrp_ledger::{LedgerConfig, ValidationError};
pub use rrp_types::{Details, DetailsRecord, RatingEntry, RatingSubmission, RatingView, WeeklyHours};
