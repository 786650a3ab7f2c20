use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::hours::WeeklyHours;

/// Placeholder used for every field of a restaurant without a details blob.
pub const UNKNOWN: &str = "unknown";

/// Descriptive metadata persisted once per restaurant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetailsRecord {
    pub name: String,
    pub address: String,
    pub description: String,
    pub hours: WeeklyHours,
}

/// Details as observed by readers.
///
/// A restaurant that has ratings but no details blob (or no data at all)
/// reads as `Default`; it serializes with `"unknown"` in every field,
/// including `Hours`, where a known record carries a full weekly map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Details {
    Known(DetailsRecord),
    Default { name: String },
}

impl Details {
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::Default { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Known(record) => &record.name,
            Self::Default { name } => name,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn as_record(&self) -> Option<&DetailsRecord> {
        match self {
            Self::Known(record) => Some(record),
            Self::Default { .. } => None,
        }
    }
}

impl Serialize for Details {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(record) => record.serialize(serializer),
            Self::Default { name } => {
                let mut state = serializer.serialize_struct("Details", 4)?;
                state.serialize_field("Name", name)?;
                state.serialize_field("Address", UNKNOWN)?;
                state.serialize_field("Description", UNKNOWN)?;
                state.serialize_field("Hours", UNKNOWN)?;
                state.end()
            }
        }
    }
}

/// Details merged with the current average, as returned by rating queries.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RatingView {
    #[serde(flatten)]
    pub details: Details,
    pub average: Option<f64>,
}
