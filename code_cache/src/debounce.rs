//! # Debounced Writer
//!
//! Editors fire a change event on every keystroke. Persisting each one would
//! hammer the storage medium, so changes are coalesced per key: every
//! [`DebouncedWriter::notify_change`] cancels the key's pending write and
//! schedules a fresh one after the quiet period. Only the last code of a burst
//! reaches the [`TtlCacheStore`].
//!
//! Each key has at most one pending write, and firing, flushing and
//! discarding all happen under the same lock, so writes for one key are
//! totally ordered. Different keys are independent.
//!
//! Switching the active editor flushes the previous key immediately instead
//! of dropping its pending write.

use crate::error::CacheError;
use crate::key::CacheKey;
use crate::store::TtlCacheStore;
use crate::ttl::RemainingTtl;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use util::config::AppConfig;

/// Save indicator shown next to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    /// A write is scheduled but has not fired yet.
    Saving,
    Saved,
    /// The write fired but the medium rejected it.
    Error,
}

/// Status update published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub key: CacheKey,
    pub status: SaveStatus,
    /// Formatted time left before the draft expires, once saved.
    pub remaining: Option<String>,
}

struct PendingWrite {
    generation: u64,
    code: String,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct WriterState {
    pending: HashMap<CacheKey, PendingWrite>,
    statuses: HashMap<CacheKey, SaveStatus>,
    starters: HashMap<CacheKey, String>,
    active: Option<CacheKey>,
    next_generation: u64,
}

struct Shared {
    store: Arc<TtlCacheStore>,
    state: Mutex<WriterState>,
    events: broadcast::Sender<CacheStatus>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, WriterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, key: &CacheKey, status: SaveStatus, remaining: Option<String>) {
        // No subscribers is fine.
        let _ = self.events.send(CacheStatus {
            key: key.clone(),
            status,
            remaining,
        });
    }

    /// Writes `code` for `key`; the caller holds the state lock.
    fn commit(&self, state: &mut WriterState, key: &CacheKey, code: &str) -> SaveStatus {
        let (status, remaining) = match self.store.write(key, code) {
            Ok(()) => (
                SaveStatus::Saved,
                Some(RemainingTtl::from_delta(self.store.ttl()).to_string()),
            ),
            Err(e) => {
                tracing::warn!(%key, error = %e, "Debounced write failed; draft kept in editor only");
                (SaveStatus::Error, None)
            }
        };
        state.statuses.insert(key.clone(), status);
        self.publish(key, status, remaining);
        status
    }

    /// Timer callback. A stale generation means the write was superseded,
    /// flushed or discarded in the meantime.
    fn fire(&self, key: &CacheKey, generation: u64) {
        let mut state = self.lock();
        let current = state
            .pending
            .get(key)
            .is_some_and(|pending| pending.generation == generation);
        if !current {
            return;
        }
        if let Some(pending) = state.pending.remove(key) {
            self.commit(&mut state, key, &pending.code);
        }
    }

    fn flush_locked(&self, state: &mut WriterState, key: &CacheKey) -> Option<SaveStatus> {
        let pending = state.pending.remove(key)?;
        pending.timer.abort();
        Some(self.commit(state, key, &pending.code))
    }
}

#[derive(Clone)]
pub struct DebouncedWriter {
    shared: Arc<Shared>,
    quiet: Duration,
}

impl DebouncedWriter {
    pub fn new(store: Arc<TtlCacheStore>, quiet: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            shared: Arc::new(Shared {
                store,
                state: Mutex::default(),
                events,
            }),
            quiet,
        }
    }

    pub fn from_config(store: Arc<TtlCacheStore>, config: &AppConfig) -> Self {
        Self::new(store, config.cache_debounce())
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    pub fn store(&self) -> &Arc<TtlCacheStore> {
        &self.shared.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheStatus> {
        self.shared.events.subscribe()
    }

    /// Records the untouched starter code for `key`. Changes equal to it are
    /// never persisted.
    pub fn register_starter(&self, key: CacheKey, starter: impl Into<String>) {
        self.shared.lock().starters.insert(key, starter.into());
    }

    /// Schedules `code` to be written for `key` once the quiet period passes
    /// without another change for the same key.
    ///
    /// Returns `None` when `code` equals the registered starter: any pending
    /// write is cancelled and an existing draft removed, so untouched code
    /// never shows up as saved work.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn notify_change(&self, key: CacheKey, code: impl Into<String>) -> Option<SaveStatus> {
        let code = code.into();
        let mut state = self.shared.lock();

        if let Some(previous) = state.pending.remove(&key) {
            previous.timer.abort();
        }

        if state.starters.get(&key) == Some(&code) {
            state.statuses.remove(&key);
            if let Err(e) = self.shared.store.delete(&key) {
                tracing::warn!(%key, error = %e, "Failed to clear draft reverted to starter code");
            }
            return None;
        }

        let generation = state.next_generation;
        state.next_generation += 1;

        let shared = Arc::clone(&self.shared);
        let quiet = self.quiet;
        let timer_key = key.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            shared.fire(&timer_key, generation);
        });

        state.pending.insert(
            key.clone(),
            PendingWrite {
                generation,
                code,
                timer,
            },
        );
        state.statuses.insert(key.clone(), SaveStatus::Saving);
        self.shared.publish(&key, SaveStatus::Saving, None);
        Some(SaveStatus::Saving)
    }

    /// Writes the pending change for `key` now. `None` if nothing was pending.
    pub fn flush(&self, key: &CacheKey) -> Option<SaveStatus> {
        let mut state = self.shared.lock();
        self.shared.flush_locked(&mut state, key)
    }

    /// Flushes every pending change; returns how many were written.
    pub fn flush_all(&self) -> usize {
        let mut state = self.shared.lock();
        let keys: Vec<CacheKey> = state.pending.keys().cloned().collect();
        keys.iter()
            .filter_map(|key| self.shared.flush_locked(&mut state, key))
            .count()
    }

    /// Makes `key` the active editor, flushing the previously active key's
    /// pending change.
    pub fn switch_active(&self, key: CacheKey) {
        let mut state = self.shared.lock();
        if let Some(previous) = state.active.take() {
            if previous != key {
                self.shared.flush_locked(&mut state, &previous);
            }
        }
        state.active = Some(key);
    }

    pub fn active(&self) -> Option<CacheKey> {
        self.shared.lock().active.clone()
    }

    /// Drops any pending change for `key` and deletes its draft.
    pub fn discard(&self, key: &CacheKey) -> Result<(), CacheError> {
        let mut state = self.shared.lock();
        if let Some(pending) = state.pending.remove(key) {
            pending.timer.abort();
        }
        state.statuses.remove(key);
        self.shared.store.delete(key)
    }

    pub fn status(&self, key: &CacheKey) -> Option<SaveStatus> {
        self.shared.lock().statuses.get(key).copied()
    }

    pub fn has_pending(&self, key: &CacheKey) -> bool {
        self.shared.lock().pending.contains_key(key)
    }
}
