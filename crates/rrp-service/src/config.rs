use std::path::{Path, PathBuf};
use std::sync::Arc;

use rrp_ledger::LedgerConfig;
use rrp_store::{BlobStore, FsBlobStore, InMemoryBlobStore};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::notify::NotificationConfig;

/// Which blob store backs the pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory,
    Filesystem { root: PathBuf },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Filesystem {
            root: PathBuf::from("rrp-data"),
        }
    }
}

impl StoreConfig {
    /// Open the configured backend.
    pub async fn open(&self) -> ServiceResult<Arc<dyn BlobStore>> {
        match self {
            Self::Memory => Ok(Arc::new(InMemoryBlobStore::new())),
            Self::Filesystem { root } => Ok(Arc::new(FsBlobStore::open(root.clone()).await?)),
        }
    }
}

/// Configuration of a rating pool, passed explicitly to [`crate::RatingPool`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub store: StoreConfig,
    pub ledger: LedgerConfig,
    pub notification: NotificationConfig,
}

impl PoolConfig {
    /// An in-memory pool with default settings.
    pub fn in_memory() -> Self {
        Self {
            store: StoreConfig::Memory,
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> ServiceResult<Self> {
        toml::from_str(text).map_err(|e| ServiceError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
