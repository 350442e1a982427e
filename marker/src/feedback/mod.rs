//! # Feedback Strategies Module
//!
//! This module provides the feedback side of a grading report.
//!
//! ## Contents
//!
//! - [`redacting_feedback`]: Per-test-case detail lines that never reveal hidden test data.
//! - [`summary`]: The one-line verdict message driven by the dominant failure category.

pub mod redacting_feedback;
pub mod summary;
