//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables (and a `.env`
//! file when present). It provides thread-safe access and mutation for testing
//! or overrides in embedding hosts.

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};
use std::time::Duration;

/// Default lifetime of a cached editor buffer: six hours.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 6 * 60 * 60;
/// Default quiet period before a debounced write fires.
pub const DEFAULT_DEBOUNCE_MS: u64 = 2_000;
/// Default interval between two expiry sweeps: one hour.
pub const DEFAULT_SWEEP_SECONDS: u64 = 60 * 60;

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub cache_namespace: String,
    pub cache_ttl_seconds: u64,
    pub cache_debounce_ms: u64,
    pub cache_sweep_seconds: u64,
    pub cache_file: String,
    pub grader_url: String,
    pub grader_timeout_seconds: u64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

/// Reads `key` and parses it, falling back to `default` when the variable is
/// unset or unparseable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
            default
        }),
        Err(_) => default,
    }
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every key has a default, so loading never fails. Durations of zero are
    /// replaced by their defaults since a zero TTL or interval is meaningless.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let non_zero = |value: u64, default: u64| if value == 0 { default } else { value };

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "code-workbench".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "logs/workbench.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            cache_namespace: env::var("CODE_CACHE_NAMESPACE")
                .unwrap_or_else(|_| "code-cache:".into()),
            cache_ttl_seconds: non_zero(
                env_or("CODE_CACHE_TTL_SECONDS", DEFAULT_CACHE_TTL_SECONDS),
                DEFAULT_CACHE_TTL_SECONDS,
            ),
            cache_debounce_ms: non_zero(
                env_or("CODE_CACHE_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS),
                DEFAULT_DEBOUNCE_MS,
            ),
            cache_sweep_seconds: non_zero(
                env_or("CODE_CACHE_SWEEP_SECONDS", DEFAULT_SWEEP_SECONDS),
                DEFAULT_SWEEP_SECONDS,
            ),
            cache_file: env::var("CODE_CACHE_FILE")
                .unwrap_or_else(|_| "data/code_cache.json".into()),
            grader_url: env::var("GRADER_URL").unwrap_or_else(|_| "http://127.0.0.1:3001".into()),
            grader_timeout_seconds: non_zero(env_or("GRADER_TIMEOUT_SECONDS", 30), 30),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap();
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn cache_debounce(&self) -> Duration {
        Duration::from_millis(self.cache_debounce_ms)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_seconds)
    }

    pub fn grader_timeout(&self) -> Duration {
        Duration::from_secs(self.grader_timeout_seconds)
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_cache_namespace(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.cache_namespace = value.into());
    }

    pub fn set_cache_ttl_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.cache_ttl_seconds = value);
    }

    pub fn set_cache_debounce_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.cache_debounce_ms = value);
    }

    pub fn set_cache_sweep_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.cache_sweep_seconds = value);
    }

    pub fn set_cache_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.cache_file = value.into());
    }

    pub fn set_grader_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.grader_url = value.into());
    }

    pub fn set_grader_timeout_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.grader_timeout_seconds = value);
    }
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn cache_namespace() -> String {
    AppConfig::global().cache_namespace.clone()
}

pub fn cache_file() -> String {
    AppConfig::global().cache_file.clone()
}

pub fn grader_url() -> String {
    AppConfig::global().grader_url.clone()
}
