use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, BlobKey, BlobMeta, Precondition};
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Blobs are held behind a `RwLock`; the
/// lock is never held across an `.await`, so conditional writes are atomic.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<BlobKey, Blob>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Sorted list of all keys within one namespace.
    pub fn keys_in(&self, namespace: &str) -> Vec<String> {
        let map = self.blobs.read().expect("lock poisoned");
        let mut keys: Vec<String> = map
            .keys()
            .filter(|k| k.namespace == namespace)
            .map(|k| k.key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Remove all blobs from the store.
    pub fn clear(&self) {
        self.blobs.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn head(&self, key: &BlobKey) -> StoreResult<Option<BlobMeta>> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.get(key).map(|blob| blob.meta.clone()))
    }

    async fn read(&self, key: &BlobKey) -> StoreResult<Blob> {
        let map = self.blobs.read().expect("lock poisoned");
        map.get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    async fn write(&self, key: &BlobKey, data: Vec<u8>) -> StoreResult<BlobMeta> {
        let blob = Blob::new(data);
        let meta = blob.meta.clone();
        self.blobs
            .write()
            .expect("lock poisoned")
            .insert(key.clone(), blob);
        tracing::debug!(%key, size = meta.size, etag = meta.etag.short(), "blob written");
        Ok(meta)
    }

    async fn write_if(
        &self,
        key: &BlobKey,
        data: Vec<u8>,
        precondition: Precondition,
    ) -> StoreResult<BlobMeta> {
        let mut map = self.blobs.write().expect("lock poisoned");
        let current = map.get(key).map(|blob| &blob.meta.etag);
        if !precondition.holds(current) {
            return Err(StoreError::PreconditionFailed {
                key: key.clone(),
                expected: precondition.to_string(),
            });
        }
        let blob = Blob::new(data);
        let meta = blob.meta.clone();
        map.insert(key.clone(), blob);
        tracing::debug!(%key, size = meta.size, etag = meta.etag.short(), %precondition, "blob written conditionally");
        Ok(meta)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &count)
            .finish()
    }
}
