use std::sync::Arc;

use rrp_ledger::{DetailsBook, RatingLedger};
use rrp_store::{BlobStore, InMemoryBlobStore};
use rrp_types::{RatingEntry, RatingView};
use serde_json::Value;

use crate::config::PoolConfig;
use crate::error::ServiceResult;
use crate::notify::{LogNotifier, Notifier};
use crate::query::QueryService;
use crate::submit::{SubmissionOutcome, SubmissionService};

/// High-level rating pool API.
///
/// Wires one blob store into the ledger, details, and both orchestrators.
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct RatingPool {
    ledger: RatingLedger,
    submissions: SubmissionService,
    queries: QueryService,
}

impl RatingPool {
    /// Open the store named by `config` and alert through [`LogNotifier`].
    pub async fn open(config: &PoolConfig) -> ServiceResult<Self> {
        let store = config.store.open().await?;
        Ok(Self::with_parts(config, store, Arc::new(LogNotifier)))
    }

    /// A pool over a fresh in-memory store.
    pub fn in_memory(config: &PoolConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_parts(config, Arc::new(InMemoryBlobStore::new()), notifier)
    }

    pub fn with_parts(
        config: &PoolConfig,
        store: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let ledger = RatingLedger::new(store.clone(), config.ledger.clone());
        let details = DetailsBook::new(store);
        let submissions = SubmissionService::new(
            ledger.clone(),
            details.clone(),
            notifier,
            config.notification.clone(),
        );
        let queries = QueryService::new(ledger.clone(), details);
        Self {
            ledger,
            submissions,
            queries,
        }
    }

    // ---- Request flows ----

    pub async fn submit(&self, payload: &Value) -> ServiceResult<SubmissionOutcome> {
        self.submissions.submit(payload).await
    }

    pub async fn get(&self, restaurant: &str) -> ServiceResult<RatingView> {
        self.queries.get(restaurant).await
    }

    // ---- Inspection ----

    pub async fn entries(&self, restaurant: &str) -> ServiceResult<Vec<RatingEntry>> {
        Ok(self.ledger.entries(restaurant).await?)
    }
}

impl std::fmt::Debug for RatingPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingPool")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}
