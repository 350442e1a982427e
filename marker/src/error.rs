//! Marker Error Types
//!
//! This module defines the [`GradingError`] enum, raised when a grader payload cannot be
//! turned into validated test case outcomes. Invalid execution metrics are
//! not errors: they degrade to a "N/A" display value instead.
//!
//! # Example
//!
//! ```rust
//! use marker::error::GradingError;
//!
//! let err = GradingError::MalformedOutcome { index: 3, reason: "unknown status 'XYZ'".into() };
//! assert_eq!(err.to_string(), "malformed outcome at position 3: unknown status 'XYZ'");
//! ```

use thiserror::Error;

/// Represents all error types that can occur while validating grading results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradingError {
    /// A single record does not describe a test case outcome.
    #[error("malformed outcome at position {index}: {reason}")]
    MalformedOutcome { index: usize, reason: String },
    /// The payload is not valid JSON or not a list of records.
    #[error("invalid grader payload: {0}")]
    InvalidJson(String),
}
