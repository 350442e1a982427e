//! Error types for the code cache.
//!
//! Storage problems are never fatal to the editor: callers receive them as
//! values, report a status to the user and keep the in-memory buffer.

use thiserror::Error;

/// Failures of the underlying key/value medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The medium cannot be used at all (missing, locked, poisoned).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The write would exceed the medium's capacity.
    #[error("storage quota exceeded: {needed} bytes needed, {limit} bytes allowed")]
    QuotaExceeded { needed: usize, limit: usize },
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by the TTL cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage failure: {0}")]
    StorageFailure(#[from] StorageError),
    /// A storage key does not decode into a `(problem, language)` pair.
    #[error("malformed cache key '{0}'")]
    MalformedKey(String),
}
