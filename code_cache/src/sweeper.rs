//! Background eviction of expired drafts.

use crate::store::TtlCacheStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use util::config::AppConfig;

/// Shortest period the sweeper will tick at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically calls [`TtlCacheStore::sweep`]: once right away, then every
/// `interval` until the returned handle is stopped or dropped.
pub struct ExpirySweeper;

impl ExpirySweeper {
    /// Must be called from within a Tokio runtime. Intervals below
    /// [`MIN_SWEEP_INTERVAL`] (including zero) are raised to it.
    pub fn spawn(store: Arc<TtlCacheStore>, interval: Duration) -> SweeperHandle {
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // The first tick completes immediately.
                ticker.tick().await;
                match store.sweep() {
                    Ok(removed) => tracing::debug!(removed, "Expiry sweep finished"),
                    Err(e) => tracing::warn!(error = %e, "Expiry sweep failed"),
                }
            }
        });

        SweeperHandle { task: Some(task) }
    }

    pub fn spawn_from_config(store: Arc<TtlCacheStore>, config: &AppConfig) -> SweeperHandle {
        Self::spawn(store, config.cache_sweep_interval())
    }
}

/// Owns the sweep task. Dropping the handle cancels it.
#[derive(Debug)]
pub struct SweeperHandle {
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Expiry sweeper stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::CacheKey;
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use chrono::TimeDelta;
    use util::clock::ManualClock;
    use util::languages::Language;

    const HOUR: Duration = Duration::from_secs(3600);

    fn setup() -> (Arc<TtlCacheStore>, Arc<MemoryStorage>, ManualClock) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = ManualClock::at_epoch();
        let store = Arc::new(TtlCacheStore::new(
            storage.clone(),
            Arc::new(clock.clone()),
            "code-cache:",
            6 * HOUR,
        ));
        (store, storage, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_eagerly_at_start() {
        let (store, storage, clock) = setup();
        store.write(&CacheKey::new("p", Language::Go), "x").unwrap();
        clock.advance(TimeDelta::hours(7));

        let _sweeper = ExpirySweeper::spawn(store, HOUR);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert!(storage.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_again_on_every_interval() {
        let (store, storage, clock) = setup();
        let _sweeper = ExpirySweeper::spawn(store.clone(), HOUR);
        tokio::time::sleep(Duration::from_millis(1)).await;

        store.write(&CacheKey::new("p", Language::Go), "x").unwrap();
        clock.advance(TimeDelta::hours(7));
        assert_eq!(storage.len(), 1);

        tokio::time::sleep(HOUR).await;
        assert!(storage.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_clamped_instead_of_panicking() {
        let (store, storage, clock) = setup();
        let sweeper = ExpirySweeper::spawn(store.clone(), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(sweeper.is_running());

        store.write(&CacheKey::new("p", Language::Go), "x").unwrap();
        clock.advance(TimeDelta::hours(7));
        tokio::time::sleep(MIN_SWEEP_INTERVAL).await;

        assert!(storage.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_sweeper_no_longer_evicts() {
        let (store, storage, clock) = setup();
        let mut sweeper = ExpirySweeper::spawn(store.clone(), HOUR);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(sweeper.is_running());

        sweeper.stop();
        store.write(&CacheKey::new("p", Language::Go), "x").unwrap();
        clock.advance(TimeDelta::hours(7));
        tokio::time::sleep(HOUR * 3).await;

        assert!(!sweeper.is_running());
        assert_eq!(storage.keys().unwrap().len(), 1);
    }
}
