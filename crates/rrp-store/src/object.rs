use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of a blob: a namespace (one per restaurant) and a key within it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobKey {
    pub namespace: String,
    pub key: String,
}

impl BlobKey {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.key)
    }
}

/// Entity tag of a stored blob: the hex BLAKE3 digest of its content.
///
/// Two blobs with identical bytes share a tag. Rating ledgers never repeat
/// content across versions (each append adds a fresh id), so the tag works
/// as a version token for optimistic concurrency.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ETag(String);

impl ETag {
    /// Compute the tag for a blob's content.
    pub fn compute(data: &[u8]) -> Self {
        Self(blake3::hash(data).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short representation (first 8 characters).
    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata returned by `head` and by writes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    pub etag: ETag,
    pub size: u64,
}

impl BlobMeta {
    pub fn for_data(data: &[u8]) -> Self {
        Self {
            etag: ETag::compute(data),
            size: data.len() as u64,
        }
    }
}

/// A blob read back from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
    pub meta: BlobMeta,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        let meta = BlobMeta::for_data(&data);
        Self { data, meta }
    }
}

/// Condition for a conditional write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Precondition {
    /// Write only if no blob exists under the key.
    IfAbsent,
    /// Write only if the current blob has this tag.
    IfMatch(ETag),
}

impl Precondition {
    /// Check the condition against the current state of the key.
    pub fn holds(&self, current: Option<&ETag>) -> bool {
        match (self, current) {
            (Self::IfAbsent, None) => true,
            (Self::IfMatch(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IfAbsent => write!(f, "absent"),
            Self::IfMatch(etag) => write!(f, "etag {}", etag.short()),
        }
    }
}
