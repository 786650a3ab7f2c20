//! Storage-backed rating logic for the Restaurant Rating Pool (RRP).
//!
//! This crate is the heart of RRP. It provides:
//! - [`RatingLedger`]: the per-restaurant ratings CSV, appended with
//!   optimistic concurrency, and its running average
//! - [`DetailsBook`]: the per-restaurant details JSON, written once and
//!   read with a placeholder default
//! - [`validate_submission`]: structural and range checks turning a raw
//!   JSON payload into a typed [`rrp_types::RatingSubmission`]
//!
//! Nothing here holds state between calls; every operation re-reads the
//! store.

pub mod config;
pub mod details;
pub mod error;
pub mod layout;
pub mod ratings;
pub mod validation;

pub use config::LedgerConfig;
pub use details::DetailsBook;
pub use error::{LedgerError, LedgerResult, ValidationError};
pub use layout::{details_key, ratings_key, DETAILS_KEY, RATINGS_HEADER, RATINGS_KEY, RATING_COLUMN};
pub use ratings::{below_average, AppendReceipt, RatingLedger};
pub use validation::{validate_name, validate_submission};
