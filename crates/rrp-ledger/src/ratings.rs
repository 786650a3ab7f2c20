use std::sync::Arc;

use rrp_store::{AggregateQuery, BlobStore, Precondition, StoreError};
use rrp_types::{round_to_cents, RatingEntry};
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::layout::{ratings_key, RATINGS_HEADER, RATING_COLUMN};

/// Result of a successful append.
#[derive(Clone, Debug, PartialEq)]
pub struct AppendReceipt {
    /// The row that was written (rating already rounded).
    pub entry: RatingEntry,
    /// Average of the ledger as read just before this entry landed.
    /// `None` when this was the first rating.
    pub prior_average: Option<f64>,
    /// Attempts taken, 1 when no concurrent writer interfered.
    pub attempts: u32,
}

impl AppendReceipt {
    pub fn below_average(&self) -> bool {
        below_average(self.entry.rating, self.prior_average)
    }
}

/// `true` iff there is a prior average and `rating` is strictly below it.
///
/// A first-ever rating has no average to fall below.
pub fn below_average(rating: f64, prior_average: Option<f64>) -> bool {
    prior_average.is_some_and(|average| rating < average)
}

/// Per-restaurant ratings ledger stored as `<restaurant>/ratings.csv`.
///
/// The blob is a headered CSV (`id,rating`) that only ever grows. Each
/// append rewrites the whole blob, guarded by a conditional write on the
/// tag observed at read time: a concurrent append forces a re-read instead
/// of being overwritten.
#[derive(Clone)]
pub struct RatingLedger {
    store: Arc<dyn BlobStore>,
    config: LedgerConfig,
}

impl RatingLedger {
    pub fn new(store: Arc<dyn BlobStore>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current average rating, rounded to two decimals.
    ///
    /// `Ok(None)` when the restaurant has no ledger yet, which is distinct
    /// from an average of zero.
    pub async fn compute_average(&self, restaurant: &str) -> LedgerResult<Option<f64>> {
        let key = ratings_key(restaurant);
        let average = self
            .store
            .aggregate(&key, &AggregateQuery::avg(RATING_COLUMN))
            .await?
            .map(round_to_cents);
        debug!(restaurant, ?average, "average computed");
        Ok(average)
    }

    /// Append a rating and return the average observed before it.
    ///
    /// The prior average is evaluated over the same blob version whose tag
    /// guards the write.
    pub async fn append(&self, restaurant: &str, rating: f64) -> LedgerResult<AppendReceipt> {
        let key = ratings_key(restaurant);
        let entry = RatingEntry::new(rating);
        let max_attempts = self.config.max_append_attempts.max(1);

        for attempt in 1..=max_attempts {
            let (contents, precondition, prior_average) = match self.store.read(&key).await {
                Ok(blob) => {
                    let etag = blob.meta.etag;
                    let mut text = String::from_utf8(blob.data)
                        .map_err(|e| LedgerError::corrupt(&key, e))?;
                    if text.trim().is_empty() {
                        debug!(restaurant, "empty ledger blob, writing header");
                        let text = format!("{RATINGS_HEADER}\n{}", entry.to_csv_row());
                        (text, Precondition::IfMatch(etag), None)
                    } else {
                        let prior_average = AggregateQuery::avg(RATING_COLUMN)
                            .evaluate(&key, text.as_bytes())?
                            .map(round_to_cents);
                        if !text.ends_with('\n') {
                            text.push('\n');
                        }
                        text.push_str(&entry.to_csv_row());
                        (text, Precondition::IfMatch(etag), prior_average)
                    }
                }
                Err(StoreError::NotFound(_)) => {
                    debug!(restaurant, "no ledger yet, creating");
                    (
                        format!("{RATINGS_HEADER}\n{}", entry.to_csv_row()),
                        Precondition::IfAbsent,
                        None,
                    )
                }
                Err(e) => return Err(e.into()),
            };

            match self
                .store
                .write_if(&key, contents.into_bytes(), precondition)
                .await
            {
                Ok(meta) => {
                    info!(
                        restaurant,
                        rating = entry.rating,
                        ?prior_average,
                        attempt,
                        etag = meta.etag.short(),
                        "rating appended"
                    );
                    return Ok(AppendReceipt {
                        entry,
                        prior_average,
                        attempts: attempt,
                    });
                }
                Err(StoreError::PreconditionFailed { .. }) => {
                    warn!(restaurant, attempt, max_attempts, "ledger changed underneath append, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LedgerError::Contention {
            restaurant: restaurant.to_string(),
            attempts: max_attempts,
        })
    }

    /// All entries of a restaurant's ledger, oldest first.
    ///
    /// Empty when the restaurant has no ledger.
    pub async fn entries(&self, restaurant: &str) -> LedgerResult<Vec<RatingEntry>> {
        let key = ratings_key(restaurant);
        let blob = match self.store.read(&key).await {
            Ok(blob) => blob,
            Err(StoreError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(blob.data.as_slice());

        let headers = reader
            .headers()
            .map_err(|e| LedgerError::corrupt(&key, e))?;
        if headers.iter().ne(RATINGS_HEADER.split(',')) {
            let found = headers.iter().collect::<Vec<_>>().join(",");
            return Err(LedgerError::corrupt(
                &key,
                format!("expected header '{RATINGS_HEADER}', found '{found}'"),
            ));
        }

        reader
            .deserialize::<RatingEntry>()
            .map(|row| row.map_err(|e| LedgerError::corrupt(&key, e)))
            .collect()
    }
}

impl std::fmt::Debug for RatingLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingLedger")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use proptest::prelude::*;
    use rrp_store::{Blob, BlobKey, BlobMeta, InMemoryBlobStore, StoreResult};

    use super::*;

    fn ledger_with(config: LedgerConfig) -> (Arc<InMemoryBlobStore>, RatingLedger) {
        let store = Arc::new(InMemoryBlobStore::new());
        let ledger = RatingLedger::new(store.clone(), config);
        (store, ledger)
    }

    fn ledger() -> (Arc<InMemoryBlobStore>, RatingLedger) {
        ledger_with(LedgerConfig::default())
    }

    async fn raw(store: &InMemoryBlobStore, restaurant: &str) -> String {
        let blob = store.read(&ratings_key(restaurant)).await.unwrap();
        String::from_utf8(blob.data).unwrap()
    }

    /// Lets a foreign writer slip in before the first conditional write.
    struct RacingStore {
        inner: InMemoryBlobStore,
        raced: AtomicU32,
    }

    #[async_trait]
    impl BlobStore for RacingStore {
        async fn head(&self, key: &BlobKey) -> StoreResult<Option<BlobMeta>> {
            self.inner.head(key).await
        }

        async fn read(&self, key: &BlobKey) -> StoreResult<Blob> {
            self.inner.read(key).await
        }

        async fn write(&self, key: &BlobKey, data: Vec<u8>) -> StoreResult<BlobMeta> {
            self.inner.write(key, data).await
        }

        async fn write_if(
            &self,
            key: &BlobKey,
            data: Vec<u8>,
            precondition: Precondition,
        ) -> StoreResult<BlobMeta> {
            if self.raced.fetch_add(1, Ordering::SeqCst) == 0 {
                let foreign = RatingEntry::new(5.0);
                self.inner
                    .write(key, format!("{RATINGS_HEADER}\n{}", foreign.to_csv_row()).into_bytes())
                    .await?;
            }
            self.inner.write_if(key, data, precondition).await
        }
    }

    /// Lands a foreign rating of 1 right after serving the first read.
    struct InterleavingStore {
        inner: InMemoryBlobStore,
        reads: AtomicU32,
    }

    #[async_trait]
    impl BlobStore for InterleavingStore {
        async fn head(&self, key: &BlobKey) -> StoreResult<Option<BlobMeta>> {
            self.inner.head(key).await
        }

        async fn read(&self, key: &BlobKey) -> StoreResult<Blob> {
            let blob = self.inner.read(key).await?;
            if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
                let mut text = String::from_utf8(blob.data.clone()).unwrap();
                text.push('\n');
                text.push_str(&RatingEntry::new(1.0).to_csv_row());
                self.inner.write(key, text.into_bytes()).await?;
            }
            Ok(blob)
        }

        async fn write(&self, key: &BlobKey, data: Vec<u8>) -> StoreResult<BlobMeta> {
            self.inner.write(key, data).await
        }

        async fn write_if(
            &self,
            key: &BlobKey,
            data: Vec<u8>,
            precondition: Precondition,
        ) -> StoreResult<BlobMeta> {
            self.inner.write_if(key, data, precondition).await
        }
    }

    /// Every conditional write loses.
    struct ContendedStore(InMemoryBlobStore);

    #[async_trait]
    impl BlobStore for ContendedStore {
        async fn head(&self, key: &BlobKey) -> StoreResult<Option<BlobMeta>> {
            self.0.head(key).await
        }

        async fn read(&self, key: &BlobKey) -> StoreResult<Blob> {
            self.0.read(key).await
        }

        async fn write(&self, key: &BlobKey, data: Vec<u8>) -> StoreResult<BlobMeta> {
            self.0.write(key, data).await
        }

        async fn write_if(
            &self,
            key: &BlobKey,
            _data: Vec<u8>,
            precondition: Precondition,
        ) -> StoreResult<BlobMeta> {
            Err(StoreError::PreconditionFailed {
                key: key.clone(),
                expected: precondition.to_string(),
            })
        }
    }

    fn denied() -> StoreError {
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied").into()
    }

    /// Every operation fails with an I/O error.
    struct BrokenStore;

    #[async_trait]
    impl BlobStore for BrokenStore {
        async fn head(&self, _key: &BlobKey) -> StoreResult<Option<BlobMeta>> {
            Err(denied())
        }

        async fn read(&self, _key: &BlobKey) -> StoreResult<Blob> {
            Err(denied())
        }

        async fn write(&self, _key: &BlobKey, _data: Vec<u8>) -> StoreResult<BlobMeta> {
            Err(denied())
        }

        async fn write_if(
            &self,
            _key: &BlobKey,
            _data: Vec<u8>,
            _precondition: Precondition,
        ) -> StoreResult<BlobMeta> {
            Err(denied())
        }
    }

    // -----------------------------------------------------------------------
    // Average
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn no_ledger_has_no_average() {
        let (_store, ledger) = ledger();
        assert_eq!(ledger.compute_average("Cafe").await.unwrap(), None);
    }

    #[tokio::test]
    async fn average_is_rounded() {
        let (store, ledger) = ledger();
        store
            .write(&ratings_key("Cafe"), b"id,rating\na,4\nb,4\nc,3".to_vec())
            .await
            .unwrap();
        assert_eq!(ledger.compute_average("Cafe").await.unwrap(), Some(3.67));
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        let ledger = RatingLedger::new(Arc::new(BrokenStore), LedgerConfig::default());
        let err = ledger.compute_average("Cafe").await.unwrap_err();
        assert!(matches!(err, LedgerError::Store(StoreError::Io(_))));
        let err = ledger.append("Cafe", 3.0).await.unwrap_err();
        assert!(matches!(err, LedgerError::Store(StoreError::Io(_))));
    }

    // -----------------------------------------------------------------------
    // Append
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn first_append_creates_ledger() {
        let (store, ledger) = ledger();
        let receipt = ledger.append("Cafe", 4.0).await.unwrap();
        assert_eq!(receipt.prior_average, None);
        assert_eq!(receipt.attempts, 1);
        assert!(!receipt.below_average());

        let text = raw(&store, "Cafe").await;
        assert_eq!(text, format!("id,rating\n{},4", receipt.entry.id));
    }

    #[tokio::test]
    async fn second_append_reports_prior_average() {
        let (store, ledger) = ledger();
        ledger.append("Cafe", 4.0).await.unwrap();
        let receipt = ledger.append("Cafe", 2.0).await.unwrap();
        assert_eq!(receipt.prior_average, Some(4.0));
        assert!(receipt.below_average());

        let text = raw(&store, "Cafe").await;
        assert_eq!(text.lines().count(), 3);
        assert_eq!(ledger.compute_average("Cafe").await.unwrap(), Some(3.0));
    }

    #[tokio::test]
    async fn append_rounds_rating() {
        let (_store, ledger) = ledger();
        let receipt = ledger.append("Cafe", 3.456).await.unwrap();
        assert_eq!(receipt.entry.rating, 3.46);
        let entries = ledger.entries("Cafe").await.unwrap();
        assert_eq!(entries[0].rating, 3.46);
    }

    #[tokio::test]
    async fn append_after_trailing_newline_adds_no_blank_row() {
        let (store, ledger) = ledger();
        store
            .write(&ratings_key("Cafe"), b"id,rating\n".to_vec())
            .await
            .unwrap();
        let receipt = ledger.append("Cafe", 5.0).await.unwrap();
        let text = raw(&store, "Cafe").await;
        assert_eq!(text, format!("id,rating\n{},5", receipt.entry.id));
    }

    #[tokio::test]
    async fn empty_blob_gets_a_header() {
        for existing in ["", "  \n"] {
            let (store, ledger) = ledger();
            store
                .write(&ratings_key("Cafe"), existing.as_bytes().to_vec())
                .await
                .unwrap();
            let receipt = ledger.append("Cafe", 4.0).await.unwrap();
            assert_eq!(receipt.prior_average, None);
            assert_eq!(
                raw(&store, "Cafe").await,
                format!("id,rating\n{},4", receipt.entry.id)
            );
            assert_eq!(ledger.compute_average("Cafe").await.unwrap(), Some(4.0));
        }
    }

    #[tokio::test]
    async fn ledgers_are_per_restaurant() {
        let (_store, ledger) = ledger();
        ledger.append("Cafe", 5.0).await.unwrap();
        ledger.append("Diner", 1.0).await.unwrap();
        assert_eq!(ledger.compute_average("Cafe").await.unwrap(), Some(5.0));
        assert_eq!(ledger.compute_average("Diner").await.unwrap(), Some(1.0));
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn lost_race_is_retried_not_overwritten() {
        let store = Arc::new(RacingStore {
            inner: InMemoryBlobStore::new(),
            raced: AtomicU32::new(0),
        });
        let ledger = RatingLedger::new(store.clone(), LedgerConfig::default());

        let receipt = ledger.append("Cafe", 3.0).await.unwrap();
        assert_eq!(receipt.attempts, 2);
        assert_eq!(receipt.prior_average, Some(5.0));

        let entries = ledger.entries("Cafe").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rating, 5.0);
        assert_eq!(entries[1], receipt.entry);
    }

    #[tokio::test]
    async fn prior_average_matches_the_version_written_over() {
        let inner = InMemoryBlobStore::new();
        let seed = RatingEntry::new(4.0);
        inner
            .write(
                &ratings_key("Cafe"),
                format!("{RATINGS_HEADER}\n{}", seed.to_csv_row()).into_bytes(),
            )
            .await
            .unwrap();
        let store = Arc::new(InterleavingStore {
            inner,
            reads: AtomicU32::new(0),
        });
        let ledger = RatingLedger::new(store, LedgerConfig::default());

        let receipt = ledger.append("Cafe", 3.0).await.unwrap();
        assert_eq!(receipt.attempts, 2);
        assert_eq!(receipt.prior_average, Some(2.5));
        assert!(!receipt.below_average());

        let ratings: Vec<f64> = ledger
            .entries("Cafe")
            .await
            .unwrap()
            .iter()
            .map(|e| e.rating)
            .collect();
        assert_eq!(ratings, vec![4.0, 1.0, 3.0]);
    }

    #[tokio::test]
    async fn persistent_contention_gives_up() {
        let store = Arc::new(ContendedStore(InMemoryBlobStore::new()));
        let ledger = RatingLedger::new(store, LedgerConfig { max_append_attempts: 3 });
        let err = ledger.append("Cafe", 3.0).await.unwrap_err();
        assert!(matches!(err, LedgerError::Contention { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let (_store, ledger) = ledger_with(LedgerConfig { max_append_attempts: 0 });
        let receipt = ledger.append("Cafe", 3.0).await.unwrap();
        assert_eq!(receipt.attempts, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_all_land() {
        let (_store, ledger) = ledger_with(LedgerConfig { max_append_attempts: 64 });
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.append("Cafe", 1.0 + (i % 5) as f64).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(ledger.entries("Cafe").await.unwrap().len(), 16);
    }

    // -----------------------------------------------------------------------
    // Entries
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn entries_of_missing_ledger_is_empty() {
        let (_store, ledger) = ledger();
        assert!(ledger.entries("Cafe").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn entries_in_append_order() {
        let (_store, ledger) = ledger();
        let a = ledger.append("Cafe", 1.0).await.unwrap().entry;
        let b = ledger.append("Cafe", 2.5).await.unwrap().entry;
        assert_eq!(ledger.entries("Cafe").await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn entries_reject_wrong_header() {
        let (store, ledger) = ledger();
        store
            .write(&ratings_key("Cafe"), b"uid,score\na,4".to_vec())
            .await
            .unwrap();
        let err = ledger.entries("Cafe").await.unwrap_err();
        assert!(matches!(err, LedgerError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn entries_reject_bad_rows() {
        let (store, ledger) = ledger();
        store
            .write(&ratings_key("Cafe"), b"id,rating\nnot-a-uuid,4".to_vec())
            .await
            .unwrap();
        assert!(matches!(
            ledger.entries("Cafe").await.unwrap_err(),
            LedgerError::Corrupt { .. }
        ));
    }

    // -----------------------------------------------------------------------
    // Below average
    // -----------------------------------------------------------------------

    #[test]
    fn below_average_cases() {
        assert!(below_average(2.0, Some(4.0)));
        assert!(!below_average(4.0, Some(4.0)));
        assert!(!below_average(5.0, Some(4.0)));
        assert!(!below_average(1.0, None));
    }

    proptest! {
        #[test]
        fn never_below_without_prior(rating in -1.0e6f64..1.0e6) {
            prop_assert!(!below_average(rating, None));
        }

        #[test]
        fn append_is_reflected_in_average(ratings in proptest::collection::vec(1.0f64..=5.0, 1..12)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let (_store, ledger) = ledger();
                let mut stored = Vec::new();
                for rating in &ratings {
                    stored.push(ledger.append("Cafe", *rating).await.unwrap().entry.rating);
                }
                let expected = stored.iter().sum::<f64>() / stored.len() as f64;
                let average = ledger.compute_average("Cafe").await.unwrap().unwrap();
                assert!((average - expected).abs() <= 0.01);
            });
        }
    }
}
