//! Key/value media the cache is built on.
//!
//! The cache only needs the four primitives of [`KeyValueStorage`]; any medium
//! that offers them (browser-style local storage, a JSON file, a map in
//! memory) can back a [`TtlCacheStore`](crate::TtlCacheStore).

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;
use std::path::Path;
use std::sync::Arc;

/// Persistent string key/value primitive.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value`. On failure the previous value for `key` must survive.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`; absent keys are not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Opens a [`FileStorage`] at `path`, falling back to an in-memory medium when
/// the file cannot be used. The editor keeps working either way; drafts just
/// do not survive the process in the fallback case.
pub fn open_or_memory(path: impl AsRef<Path>) -> Arc<dyn KeyValueStorage> {
    let path = path.as_ref();
    match FileStorage::open(path) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Cache file unavailable; drafts will only be kept in memory"
            );
            Arc::new(MemoryStorage::new())
        }
    }
}
