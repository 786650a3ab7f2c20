use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, BlobKey, BlobMeta, Precondition};
use crate::traits::BlobStore;

/// Filesystem blob store: `<root>/<namespace>/<key>`.
///
/// Namespaces are arbitrary restaurant names, so each one is escaped into a
/// single path component (see [`encode_namespace`]). Keys are fixed layout
/// names and must already be plain file names.
///
/// Writes are staged to a hidden temp file in the namespace directory and
/// renamed into place, so readers never observe a half-written blob. A
/// store-wide mutex serializes writers of this instance; two processes
/// sharing one root get last-writer-wins between them.
pub struct FsBlobStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FsBlobStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::debug!(root = %root.display(), "filesystem blob store opened");
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &BlobKey) -> StoreResult<PathBuf> {
        let namespace = encode_namespace(&key.namespace)?;
        check_component(&key.key)?;
        Ok(self.root.join(namespace).join(&key.key))
    }

    async fn read_path(path: &Path) -> StoreResult<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_path(path: &Path, data: &[u8]) -> StoreResult<()> {
        let dir = path
            .parent()
            .ok_or_else(|| StoreError::InvalidKey(path.display().to_string()))?;
        tokio::fs::create_dir_all(dir).await?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::InvalidKey(path.display().to_string()))?;
        let staging = dir.join(format!(".{file_name}.{}.tmp", uuid::Uuid::now_v7().simple()));

        tokio::fs::write(&staging, data).await?;
        if let Err(e) = tokio::fs::rename(&staging, path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Escape a namespace into one directory name.
///
/// `%`, path separators and NUL become `%XX`, as does a leading `.`, so
/// `..`, `.Bar` and `AC/DC Diner` each map to a distinct plain directory.
/// The mapping is injective because `%` itself is escaped.
pub fn encode_namespace(namespace: &str) -> StoreResult<String> {
    if namespace.is_empty() {
        return Err(StoreError::InvalidKey(namespace.to_string()));
    }
    let mut encoded = String::with_capacity(namespace.len());
    for (i, c) in namespace.chars().enumerate() {
        match c {
            '%' | '/' | '\\' | '\0' => encoded.push_str(&format!("%{:02X}", c as u32)),
            '.' if i == 0 => encoded.push_str("%2E"),
            c => encoded.push(c),
        }
    }
    Ok(encoded)
}

/// Reject key names that would escape or alias the namespace layout.
fn check_component(name: &str) -> StoreResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StoreError::InvalidKey(name.to_string()));
    }
    Ok(())
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn head(&self, key: &BlobKey) -> StoreResult<Option<BlobMeta>> {
        let path = self.path_for(key)?;
        Ok(Self::read_path(&path)
            .await?
            .map(|data| BlobMeta::for_data(&data)))
    }

    async fn read(&self, key: &BlobKey) -> StoreResult<Blob> {
        let path = self.path_for(key)?;
        Self::read_path(&path)
            .await?
            .map(Blob::new)
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    async fn write(&self, key: &BlobKey, data: Vec<u8>) -> StoreResult<BlobMeta> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;
        Self::write_path(&path, &data).await?;
        let meta = BlobMeta::for_data(&data);
        tracing::debug!(%key, size = meta.size, etag = meta.etag.short(), "blob written");
        Ok(meta)
    }

    async fn write_if(
        &self,
        key: &BlobKey,
        data: Vec<u8>,
        precondition: Precondition,
    ) -> StoreResult<BlobMeta> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;

        let current = Self::read_path(&path)
            .await?
            .map(|existing| BlobMeta::for_data(&existing).etag);
        if !precondition.holds(current.as_ref()) {
            return Err(StoreError::PreconditionFailed {
                key: key.clone(),
                expected: precondition.to_string(),
            });
        }

        Self::write_path(&path, &data).await?;
        let meta = BlobMeta::for_data(&data);
        tracing::debug!(%key, size = meta.size, etag = meta.etag.short(), %precondition, "blob written conditionally");
        Ok(meta)
    }
}

impl std::fmt::Debug for FsBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsBlobStore")
            .field("root", &self.root)
            .finish()
    }
}
