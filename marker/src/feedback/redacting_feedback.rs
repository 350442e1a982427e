//! # RedactingFeedback Strategy
//!
//! The default [`Feedback`] strategy. Public test cases are shown in full so the user can
//! debug against them. Hidden test cases only ever show their verdict and metrics: input,
//! expected output and actual output are withheld whether the case passed or not, and so are
//! diagnostics, except compiler output, which does not depend on the test input.

use crate::traits::feedback::{Feedback, FeedbackEntry};
use crate::types::{OutcomeStatus, TestCaseOutcome, Visibility};
use crate::utilities::format::{format_memory, format_time};

#[derive(Debug, Default)]
pub struct RedactingFeedback;

impl Feedback for RedactingFeedback {
    fn assemble_feedback(&self, outcomes: &[TestCaseOutcome]) -> Vec<FeedbackEntry> {
        outcomes
            .iter()
            .map(|outcome| {
                let public = outcome.visibility == Visibility::Public;
                let reveal = |field: &Option<String>| if public { field.clone() } else { None };

                let message = if public || outcome.status == OutcomeStatus::CompilationError {
                    outcome.message.clone()
                } else {
                    None
                };

                FeedbackEntry {
                    index: outcome.index,
                    visibility: outcome.visibility,
                    passed: outcome.passed,
                    status: outcome.status,
                    time: format_time(outcome.metrics.time_secs),
                    memory: format_memory(outcome.metrics.memory_kb),
                    input: reveal(&outcome.stdin),
                    expected_output: reveal(&outcome.expected_output),
                    actual_output: reveal(&outcome.actual_output),
                    message,
                }
            })
            .collect()
    }
}
