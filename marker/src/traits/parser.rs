//! Parser Trait
//!
//! This module defines the [`Parser`] trait, which provides a generic interface for turning
//! loosely-typed grader data into strongly-typed Rust structures. Implementations are
//! responsible for validating the input at the boundary so that nothing downstream has to
//! second-guess its shape.
//!
//! # Example
//!
//! ```rust
//! use marker::error::GradingError;
//! use marker::traits::parser::Parser;
//!
//! struct CountParser;
//!
//! impl<'a> Parser<&'a str, usize> for CountParser {
//!     fn parse(&self, raw: &'a str) -> Result<usize, GradingError> {
//!         raw.trim().parse().map_err(|_| GradingError::InvalidJson(raw.to_string()))
//!     }
//! }
//!
//! assert_eq!(CountParser.parse(" 4 ").unwrap(), 4);
//! ```

use crate::error::GradingError;

/// A generic trait for parsing data into a strongly-typed Rust structure.
///
/// # Type Parameters
///
/// * `Input` - The input type to be parsed.
/// * `Output` - The output type produced by the parser.
pub trait Parser<Input, Output> {
    /// # Errors
    ///
    /// Returns a [`GradingError`] if the input does not conform to the expected schema.
    fn parse(&self, input: Input) -> Result<Output, GradingError>;
}
