use rrp_ledger::{validate_name, DetailsBook, RatingLedger};
use rrp_types::RatingView;
use serde_json::Value;
use tracing::info;

use crate::error::ServiceResult;

/// Average and details, fetched concurrently and merged.
#[derive(Clone)]
pub struct QueryService {
    ledger: RatingLedger,
    details: DetailsBook,
}

impl QueryService {
    pub fn new(ledger: RatingLedger, details: DetailsBook) -> Self {
        Self { ledger, details }
    }

    /// Look up a restaurant by name. Either read failing fails the lookup.
    pub async fn get(&self, restaurant: &str) -> ServiceResult<RatingView> {
        let restaurant = validate_name(Some(&Value::from(restaurant)))?;
        let (average, details) = tokio::try_join!(
            self.ledger.compute_average(&restaurant),
            self.details.fetch(&restaurant),
        )?;
        info!(%restaurant, ?average, known = details.is_known(), "rating queried");
        Ok(RatingView { details, average })
    }
}
