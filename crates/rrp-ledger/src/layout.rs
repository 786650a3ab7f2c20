//! Blob layout of a restaurant namespace.

use rrp_store::BlobKey;

/// Ratings ledger blob.
pub const RATINGS_KEY: &str = "ratings.csv";

/// Details record blob.
pub const DETAILS_KEY: &str = "details.json";

/// Header row of every ratings ledger.
pub const RATINGS_HEADER: &str = "id,rating";

/// Column averaged by the ledger.
pub const RATING_COLUMN: &str = "rating";

pub fn ratings_key(restaurant: &str) -> BlobKey {
    BlobKey::new(restaurant, RATINGS_KEY)
}

pub fn details_key(restaurant: &str) -> BlobKey {
    BlobKey::new(restaurant, DETAILS_KEY)
}
