//!
//! # Feedback Trait
//!
//! This module defines the [`Feedback`] trait and the [`FeedbackEntry`] struct, used to implement
//! pluggable strategies that turn the outcomes of a grading round into per-test-case detail
//! lines for the user.
//!

use crate::types::{OutcomeStatus, TestCaseOutcome, Visibility};
use serde::Serialize;

/// One user-facing detail line for a test case.
///
/// Formatting of metrics has already happened: `time` and `memory` are display
/// strings and fall back to `"N/A"`. The I/O fields are `None` whenever the
/// strategy decided they must not be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackEntry {
    pub index: usize,
    pub visibility: Visibility,
    pub passed: bool,
    pub status: OutcomeStatus,
    pub time: String,
    pub memory: String,
    pub input: Option<String>,
    pub expected_output: Option<String>,
    pub actual_output: Option<String>,
    pub message: Option<String>,
}

impl FeedbackEntry {
    /// Renders the entry as plain text: a headline, then indented detail
    /// lines for failing public cases and diagnostics.
    pub fn render(&self) -> String {
        let mut out = format!(
            "Test case {} ({}): {} | time {} | memory {}",
            self.index + 1,
            self.visibility.as_str(),
            self.status.label(),
            self.time,
            self.memory
        );

        if !self.passed {
            if let Some(input) = &self.input {
                out.push_str(&format!("\n  input: {input}"));
            }
            if let Some(expected) = &self.expected_output {
                out.push_str(&format!("\n  expected: {expected}"));
            }
            if let Some(actual) = &self.actual_output {
                out.push_str(&format!("\n  actual: {actual}"));
            }
            if self.visibility == Visibility::Hidden {
                out.push_str("\n  details of hidden test cases are not shown");
            }
        }
        if let Some(message) = &self.message {
            out.push_str(&format!("\n  message: {message}"));
        }
        out
    }
}

/// A trait for pluggable feedback strategies in the marker system.
///
/// # Arguments
/// - `outcomes`: the outcomes in scope for the round, in outcome order.
///
/// # Returns
/// An ordered list of feedback entries, one per outcome.
pub trait Feedback {
    fn assemble_feedback(&self, outcomes: &[TestCaseOutcome]) -> Vec<FeedbackEntry>;
}
