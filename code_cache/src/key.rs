//! Structured cache keys.
//!
//! A draft is identified by the pair `(problem_id, language)`. On the storage
//! medium the pair is flattened to `"{namespace}{problem_id}:{language}"`,
//! with `:` and `%` in the problem id percent-escaped so that distinct pairs
//! can never produce the same storage key.

use crate::error::CacheError;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use util::languages::Language;

const PROBLEM_ID_SET: &AsciiSet = &CONTROLS.add(b':').add(b'%');

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub problem_id: String,
    pub language: Language,
}

impl CacheKey {
    pub fn new(problem_id: impl Into<String>, language: Language) -> Self {
        Self {
            problem_id: problem_id.into(),
            language,
        }
    }

    /// Flattens the key into its storage form under `namespace`.
    pub fn encode(&self, namespace: &str) -> String {
        format!(
            "{namespace}{}:{}",
            utf8_percent_encode(&self.problem_id, PROBLEM_ID_SET),
            self.language.as_str()
        )
    }

    /// Parses a storage key produced by [`CacheKey::encode`].
    pub fn decode(namespace: &str, raw: &str) -> Result<Self, CacheError> {
        let malformed = || CacheError::MalformedKey(raw.to_string());

        let body = raw.strip_prefix(namespace).ok_or_else(malformed)?;
        let (escaped_id, language) = body.split_once(':').ok_or_else(malformed)?;
        if escaped_id.is_empty() {
            return Err(malformed());
        }

        let problem_id = percent_decode_str(escaped_id)
            .decode_utf8()
            .map_err(|_| malformed())?
            .into_owned();
        let language = language.parse::<Language>().map_err(|_| malformed())?;

        Ok(Self {
            problem_id,
            language,
        })
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.problem_id, self.language)
    }
}
