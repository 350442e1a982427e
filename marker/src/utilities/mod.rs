//! # Utilities
//!
//! Helpers shared across the `marker` crate.
//!
//! - [`format`]: fixed-precision display of execution metrics with a "N/A" fallback.

pub mod format;
