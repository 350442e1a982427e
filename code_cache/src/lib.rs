//! # Code Cache
//!
//! Local work preservation for the workbench editor. Editor contents are kept
//! per `(problem, language)` pair in a key/value medium with a time-to-live,
//! so a reload or a navigation away does not lose in-progress work while
//! stale drafts eventually disappear.
//!
//! ## Key Concepts
//! - **TtlCacheStore**: expiry-aware read/write/delete/sweep over a [`KeyValueStorage`].
//! - **DebouncedWriter**: coalesces bursts of edits into one delayed write per key.
//! - **ExpirySweeper**: background task that purges expired entries on an interval.
//! - **StoredEntry**: the on-medium payload, either timed or a legacy plain-text draft.

pub mod debounce;
pub mod entry;
pub mod error;
pub mod key;
pub mod storage;
pub mod store;
pub mod sweeper;
pub mod ttl;

pub use debounce::{CacheStatus, DebouncedWriter, SaveStatus};
pub use entry::{CacheEntry, StoredEntry};
pub use error::{CacheError, StorageError};
pub use key::CacheKey;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{CachedCode, TtlCacheStore};
pub use sweeper::{ExpirySweeper, SweeperHandle};
pub use ttl::RemainingTtl;
