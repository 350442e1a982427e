//! On-medium payloads.
//!
//! Current payloads are JSON objects carrying the code and its timestamps.
//! Drafts written before expiry tracking existed are plain text; they are
//! read back as [`StoredEntry::Legacy`] and never expire.

use crate::ttl::RemainingTtl;
use chrono::serde::ts_milliseconds;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A timed draft as persisted under its [`CacheKey`](crate::CacheKey).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub code: String,
    #[serde(with = "ts_milliseconds")]
    pub written_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// `expires_at` is always derived from `written_at`, saturating at the
    /// latest representable instant.
    pub fn new(code: impl Into<String>, written_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            code: code.into(),
            written_at,
            expires_at: written_at
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> RemainingTtl {
        RemainingTtl::from_delta(self.expires_at - now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredEntry {
    Timed(CacheEntry),
    /// Pre-TTL draft: kept until explicitly deleted.
    Legacy(String),
}

impl StoredEntry {
    /// Resolves a raw stored value. Never fails: anything that is not a timed
    /// entry is treated as legacy text. A JSON object with a string `code`
    /// but unusable timestamps keeps just that code.
    pub fn parse(raw: &str) -> Self {
        if let Ok(entry) = serde_json::from_str::<CacheEntry>(raw) {
            return StoredEntry::Timed(entry);
        }

        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(raw) {
            if let Some(serde_json::Value::String(code)) = map.get("code") {
                tracing::debug!("Cache payload has code but no valid expiry; treating as legacy");
                return StoredEntry::Legacy(code.clone());
            }
        }

        StoredEntry::Legacy(raw.to_string())
    }

    pub fn code(&self) -> &str {
        match self {
            StoredEntry::Timed(entry) => &entry.code,
            StoredEntry::Legacy(code) => code,
        }
    }

    pub fn into_code(self) -> String {
        match self {
            StoredEntry::Timed(entry) => entry.code,
            StoredEntry::Legacy(code) => code,
        }
    }

    /// Legacy entries never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self {
            StoredEntry::Timed(entry) => entry.is_expired(now),
            StoredEntry::Legacy(_) => false,
        }
    }
}
