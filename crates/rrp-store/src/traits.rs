use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, BlobKey, BlobMeta, Precondition};
use crate::query::AggregateQuery;

/// Namespaced key-blob store.
///
/// All implementations must satisfy these invariants:
/// - `read` of a missing blob fails with `StoreError::NotFound`.
/// - `write` overwrites unconditionally (last writer wins).
/// - `write_if` checks its precondition and writes as one atomic step with
///   respect to other writes on the same store instance.
/// - Every stored blob reports the [`crate::ETag`] of its exact content.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Metadata for a blob, or `Ok(None)` if it does not exist.
    async fn head(&self, key: &BlobKey) -> StoreResult<Option<BlobMeta>>;

    /// Read a blob. Fails with `StoreError::NotFound` when absent.
    async fn read(&self, key: &BlobKey) -> StoreResult<Blob>;

    /// Write a blob, replacing whatever was there.
    async fn write(&self, key: &BlobKey, data: Vec<u8>) -> StoreResult<BlobMeta>;

    /// Write a blob only if `precondition` holds for the current state.
    ///
    /// Fails with `StoreError::PreconditionFailed` otherwise, leaving the
    /// stored blob untouched.
    async fn write_if(
        &self,
        key: &BlobKey,
        data: Vec<u8>,
        precondition: Precondition,
    ) -> StoreResult<BlobMeta>;

    /// Check whether a blob exists.
    async fn exists(&self, key: &BlobKey) -> StoreResult<bool> {
        Ok(self.head(key).await?.is_some())
    }

    /// Run an aggregate query over a CSV blob.
    ///
    /// Returns `Ok(None)` when the blob does not exist. Backends with a
    /// native query engine may override this; the default reads the blob
    /// and evaluates locally.
    async fn aggregate(&self, key: &BlobKey, query: &AggregateQuery) -> StoreResult<Option<f64>> {
        match self.read(key).await {
            Ok(blob) => query.evaluate(key, &blob.data),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
