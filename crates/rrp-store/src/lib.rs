//! Namespaced blob storage for the Restaurant Rating Pool.
//!
//! The pool treats an object store as a makeshift database: every restaurant
//! owns a namespace, and each namespace holds a handful of small blobs. This
//! crate provides that key-blob store with the four capabilities the rest of
//! the system relies on: existence check, read, write, and a restricted
//! aggregate query over a single CSV blob.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsBlobStore`] -- one directory per namespace under a root directory
//!
//! # Design Rules
//!
//! 1. A missing blob is `StoreError::NotFound`, never an empty blob.
//! 2. Plain writes are last-writer-wins.
//! 3. Every blob carries an [`ETag`] derived from its content; conditional
//!    writes compare it atomically within a store instance.
//! 4. The store never interprets blob contents, except for aggregate queries.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod query;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;
pub use object::{Blob, BlobKey, BlobMeta, ETag, Precondition};
pub use query::{Aggregate, AggregateQuery};
pub use traits::BlobStore;
