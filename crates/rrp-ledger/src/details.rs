use std::sync::Arc;

use rrp_store::{BlobStore, Precondition, StoreError};
use rrp_types::{Details, DetailsRecord, RatingSubmission};
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::layout::details_key;

/// Per-restaurant details stored as `<restaurant>/details.json`.
///
/// The record is written by the first submission for a restaurant and is
/// never updated afterwards.
#[derive(Clone)]
pub struct DetailsBook {
    store: Arc<dyn BlobStore>,
}

impl DetailsBook {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Details of a restaurant, or [`Details::Default`] when none exist.
    pub async fn fetch(&self, restaurant: &str) -> LedgerResult<Details> {
        let key = details_key(restaurant);
        match self.store.read(&key).await {
            Ok(blob) => {
                let record: DetailsRecord = serde_json::from_slice(&blob.data)
                    .map_err(|e| LedgerError::corrupt(&key, e))?;
                Ok(Details::Known(record))
            }
            Err(StoreError::NotFound(_)) => {
                debug!(restaurant, "no details recorded, using placeholder");
                Ok(Details::placeholder(restaurant))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the details carried by `submission` unless the restaurant has
    /// some already. Returns `true` if this call created the record.
    pub async fn ensure_exists(&self, submission: &RatingSubmission) -> LedgerResult<bool> {
        let key = details_key(&submission.name);
        if self.store.exists(&key).await? {
            debug!(restaurant = %submission.name, "details already recorded");
            return Ok(false);
        }

        let record = submission.details_record();
        let data =
            serde_json::to_vec(&record).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        match self.store.write_if(&key, data, Precondition::IfAbsent).await {
            Ok(_) => {
                info!(restaurant = %submission.name, "details recorded");
                Ok(true)
            }
            // Another submission created them between the check and the write.
            Err(StoreError::PreconditionFailed { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for DetailsBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailsBook").finish_non_exhaustive()
    }
}
