use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest accepted rating (inclusive).
pub const MIN_RATING: f64 = 1.0;

/// Highest accepted rating (inclusive).
pub const MAX_RATING: f64 = 5.0;

/// Round a value to two decimal places.
///
/// Used both for incoming ratings and for computed averages so that what is
/// stored and what is reported share the same precision.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One row of a restaurant's ratings ledger.
///
/// The `id` only keeps rows distinguishable; nothing looks entries up by id.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub id: Uuid,
    pub rating: f64,
}

impl RatingEntry {
    /// Create an entry with a fresh time-ordered id. The rating is rounded
    /// to two decimal places.
    pub fn new(rating: f64) -> Self {
        Self {
            id: Uuid::now_v7(),
            rating: round_to_cents(rating),
        }
    }

    /// Render this entry as a CSV row (`<id>,<rating>`), without terminator.
    pub fn to_csv_row(&self) -> String {
        format!("{},{}", self.id, self.rating)
    }
}
