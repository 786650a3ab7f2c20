//! Foundation types for the Restaurant Rating Pool (RRP).
//!
//! This crate provides the value types shared by every other RRP crate.
//! Nothing here touches storage; all types are plain data with serde
//! support matching the blob formats written to the pool.
//!
//! # Key Types
//!
//! - [`RatingEntry`]: one row of a restaurant's ratings ledger
//! - [`WeeklyHours`] / [`Weekday`]: opening hours keyed by all seven days
//! - [`DetailsRecord`]: descriptive metadata persisted per restaurant
//! - [`Details`]: a known record or the placeholder for a missing one
//! - [`RatingSubmission`]: a validated, typed rating submission
//! - [`RatingView`]: details merged with the current average

pub mod details;
pub mod error;
pub mod hours;
pub mod rating;
pub mod submission;

pub use details::{Details, DetailsRecord, RatingView, UNKNOWN};
pub use error::TypeError;
pub use hours::{Weekday, WeeklyHours};
pub use rating::{round_to_cents, RatingEntry, MAX_RATING, MIN_RATING};
pub use submission::{
    RatingSubmission, MAX_ADDRESS_LEN, MAX_DESCRIPTION_LEN, MAX_HOURS_LEN, MAX_NAME_LEN,
};
