use serde::{Deserialize, Serialize};

use crate::details::DetailsRecord;
use crate::hours::WeeklyHours;

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 250;
pub const MAX_ADDRESS_LEN: usize = 150;
pub const MAX_HOURS_LEN: usize = 50;

/// A rating submission that has passed validation.
///
/// Never persisted as-is: it is split into a ledger entry and, for the
/// first submission of a restaurant, a [`DetailsRecord`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatingSubmission {
    pub name: String,
    pub description: String,
    pub address: String,
    pub hours: WeeklyHours,
    pub rating: f64,
}

impl RatingSubmission {
    pub fn details_record(&self) -> DetailsRecord {
        DetailsRecord {
            name: self.name.clone(),
            address: self.address.clone(),
            description: self.description.clone(),
            hours: self.hours.clone(),
        }
    }
}
