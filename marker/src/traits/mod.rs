//!
//! Traits Module
//!
//! This module contains core traits used throughout the marker system for extensibility and abstraction.
//!
//! - [`feedback`]: Defines the pluggable per-outcome feedback strategy.
//! - [`parser`]: Defines the generic trait for validating loosely-typed grader data into Rust types.

pub mod feedback;
pub mod parser;
