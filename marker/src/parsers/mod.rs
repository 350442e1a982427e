//!
//! Parsers Module
//!
//! Boundary validation of grader payloads.
//!
//! - [`outcome_parser`]: Validates loosely-typed per-test-case records into [`TestCaseOutcome`](crate::types::TestCaseOutcome)s.

pub mod outcome_parser;
