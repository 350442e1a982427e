//! # TTL Cache Store
//!
//! Expiry-aware persistence of editor drafts on top of a [`KeyValueStorage`].
//!
//! - `write` stamps every entry with `written_at = now` and `expires_at = now + ttl`.
//! - `read` treats an expired entry as absent and deletes it on the way out.
//! - `sweep` walks every key under the store's namespace and evicts expired
//!   timed entries, leaving legacy drafts and foreign keys alone.

use crate::entry::{CacheEntry, StoredEntry};
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::storage::KeyValueStorage;
use crate::ttl::RemainingTtl;
use chrono::TimeDelta;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use util::clock::{Clock, SystemClock};
use util::config::AppConfig;

/// Code restored from the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedCode {
    pub code: String,
    /// `None` for legacy drafts, which have no expiry.
    pub remaining: Option<RemainingTtl>,
}

pub struct TtlCacheStore {
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    namespace: String,
    ttl: TimeDelta,
}

impl TtlCacheStore {
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
        namespace: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        // Durations beyond chrono's range are effectively "never".
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        Self {
            storage,
            clock,
            namespace: namespace.into(),
            ttl,
        }
    }

    /// Builds a store with the namespace and TTL from [`AppConfig`] on the
    /// system clock.
    pub fn from_config(storage: Arc<dyn KeyValueStorage>, config: &AppConfig) -> Self {
        Self::new(
            storage,
            Arc::new(SystemClock),
            config.cache_namespace.clone(),
            config.cache_ttl(),
        )
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Persists `code` for `key`, replacing any previous draft. A storage
    /// failure leaves the previous draft in place.
    pub fn write(&self, key: &CacheKey, code: &str) -> Result<(), CacheError> {
        let entry = CacheEntry::new(code, self.clock.now(), self.ttl);
        let payload = serde_json::to_string(&entry).map_err(crate::error::StorageError::from)?;

        self.storage
            .set(&key.encode(&self.namespace), &payload)
            .map_err(|e| {
                tracing::warn!(%key, error = %e, "Failed to persist draft");
                CacheError::from(e)
            })?;

        tracing::debug!(%key, bytes = code.len(), "Draft persisted");
        Ok(())
    }

    /// Returns the draft for `key` unless it is missing or expired. Expired
    /// drafts are removed as a side effect.
    pub fn read(&self, key: &CacheKey) -> Result<Option<CachedCode>, CacheError> {
        let storage_key = key.encode(&self.namespace);
        let Some(raw) = self.storage.get(&storage_key)? else {
            return Ok(None);
        };

        let now = self.clock.now();
        match StoredEntry::parse(&raw) {
            StoredEntry::Timed(entry) if entry.is_expired(now) => {
                tracing::debug!(%key, "Draft expired; removing");
                if let Err(e) = self.storage.remove(&storage_key) {
                    tracing::warn!(%key, error = %e, "Failed to remove expired draft");
                }
                Ok(None)
            }
            StoredEntry::Timed(entry) => Ok(Some(CachedCode {
                remaining: Some(entry.remaining(now)),
                code: entry.code,
            })),
            StoredEntry::Legacy(code) => Ok(Some(CachedCode {
                code,
                remaining: None,
            })),
        }
    }

    /// Remaining lifetime of the draft for `key`, if it has one.
    pub fn remaining(&self, key: &CacheKey) -> Result<Option<RemainingTtl>, CacheError> {
        Ok(self.read(key)?.and_then(|cached| cached.remaining))
    }

    pub fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        self.storage.remove(&key.encode(&self.namespace))?;
        Ok(())
    }

    /// Evicts every expired timed draft under this namespace and returns how
    /// many were removed.
    pub fn sweep(&self) -> Result<usize, CacheError> {
        let now = self.clock.now();
        let mut removed = 0;

        for storage_key in self.storage.keys()? {
            if !storage_key.starts_with(&self.namespace) {
                continue;
            }

            let raw = match self.storage.get(&storage_key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(key = %storage_key, error = %e, "Skipping unreadable cache entry");
                    continue;
                }
            };

            if !StoredEntry::parse(&raw).is_expired(now) {
                continue;
            }

            match self.storage.remove(&storage_key) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(key = %storage_key, error = %e, "Failed to evict expired draft")
                }
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Expired drafts swept");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStorage;
    use util::clock::ManualClock;
    use util::languages::Language;

    const NS: &str = "code-cache:";
    const SIX_HOURS: Duration = Duration::from_secs(6 * 3600);

    fn setup() -> (TtlCacheStore, Arc<MemoryStorage>, ManualClock) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = ManualClock::at_epoch();
        let store = TtlCacheStore::new(storage.clone(), Arc::new(clock.clone()), NS, SIX_HOURS);
        (store, storage, clock)
    }

    fn key(id: &str) -> CacheKey {
        CacheKey::new(id, Language::Python)
    }

    #[test]
    fn write_then_read_returns_same_code() {
        let (store, _, _) = setup();
        for code in ["", "print(1)", "line1\nline2\n", "emoji 🦀 \"quoted\""] {
            store.write(&key("p"), code).unwrap();
            let cached = store.read(&key("p")).unwrap().unwrap();
            assert_eq!(cached.code, code);
            assert_eq!(cached.remaining.unwrap().to_string(), "6h 0m");
        }
    }

    #[test]
    fn read_near_expiry_reports_minutes_left() {
        let (store, _, clock) = setup();
        store.write(&key("p"), "x").unwrap();
        clock.advance(TimeDelta::hours(5) + TimeDelta::minutes(59));
        let cached = store.read(&key("p")).unwrap().unwrap();
        assert_eq!(cached.remaining.unwrap().to_string(), "1m");
    }

    #[test]
    fn read_after_ttl_is_empty_and_deletes_entry() {
        let (store, storage, clock) = setup();
        store.write(&key("p"), "x").unwrap();
        clock.advance(TimeDelta::hours(6) + TimeDelta::minutes(1));

        assert_eq!(store.read(&key("p")).unwrap(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn rewrite_refreshes_expiry() {
        let (store, _, clock) = setup();
        store.write(&key("p"), "v1").unwrap();
        clock.advance(TimeDelta::hours(5));
        store.write(&key("p"), "v2").unwrap();
        clock.advance(TimeDelta::hours(5));

        let cached = store.read(&key("p")).unwrap().unwrap();
        assert_eq!(cached.code, "v2");
        assert_eq!(cached.remaining.unwrap().to_string(), "1h 0m");
    }

    #[test]
    fn languages_are_separate_drafts() {
        let (store, _, _) = setup();
        store.write(&CacheKey::new("p", Language::Python), "py").unwrap();
        store.write(&CacheKey::new("p", Language::Java), "java").unwrap();
        assert_eq!(
            store.read(&CacheKey::new("p", Language::Python)).unwrap().unwrap().code,
            "py"
        );
        assert_eq!(
            store.read(&CacheKey::new("p", Language::Java)).unwrap().unwrap().code,
            "java"
        );
    }

    #[test]
    fn delete_is_unconditional() {
        let (store, storage, _) = setup();
        store.delete(&key("missing")).unwrap();
        store.write(&key("p"), "x").unwrap();
        store.delete(&key("p")).unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn legacy_plain_text_is_returned_without_ttl() {
        let (store, storage, clock) = setup();
        storage.set(&key("old").encode(NS), "legacy draft").unwrap();
        clock.advance(TimeDelta::days(365));

        let cached = store.read(&key("old")).unwrap().unwrap();
        assert_eq!(cached.code, "legacy draft");
        assert_eq!(cached.remaining, None);
    }

    #[test]
    fn failed_write_keeps_prior_entry() {
        let storage = Arc::new(MemoryStorage::with_quota(200));
        let clock = ManualClock::at_epoch();
        let store = TtlCacheStore::new(storage.clone(), Arc::new(clock), NS, SIX_HOURS);

        store.write(&key("p"), "short").unwrap();
        let err = store.write(&key("p"), &"x".repeat(500)).unwrap_err();
        assert!(matches!(
            err,
            CacheError::StorageFailure(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.read(&key("p")).unwrap().unwrap().code, "short");
    }

    #[test]
    fn sweep_removes_only_expired_entries_in_namespace() {
        let (store, storage, clock) = setup();
        store.write(&key("old"), "a").unwrap();
        clock.advance(TimeDelta::hours(4));
        store.write(&key("fresh"), "b").unwrap();
        storage.set(&key("legacy").encode(NS), "plain").unwrap();
        storage.set("other-app:thing", "{\"expires_at\":0}").unwrap();
        clock.advance(TimeDelta::hours(3));

        assert_eq!(store.sweep().unwrap(), 1);
        assert_eq!(store.read(&key("old")).unwrap(), None);
        assert_eq!(store.read(&key("fresh")).unwrap().unwrap().code, "b");
        assert_eq!(store.read(&key("legacy")).unwrap().unwrap().code, "plain");
        assert!(storage.get("other-app:thing").unwrap().is_some());
    }

    #[test]
    fn sweep_is_idempotent() {
        let (store, _, clock) = setup();
        for id in ["a", "b", "c"] {
            store.write(&key(id), id).unwrap();
        }
        clock.advance(TimeDelta::hours(7));

        assert_eq!(store.sweep().unwrap(), 3);
        assert_eq!(store.sweep().unwrap(), 0);
    }

    #[test]
    fn zero_length_namespace_still_sweeps() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = ManualClock::at_epoch();
        let store = TtlCacheStore::new(storage.clone(), Arc::new(clock.clone()), "", SIX_HOURS);
        store.write(&key("p"), "x").unwrap();
        clock.advance(TimeDelta::hours(7));
        assert_eq!(store.sweep().unwrap(), 1);
    }
}
