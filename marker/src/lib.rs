//! # Marker Library
//!
//! This module provides the grading result aggregator of the workbench. It turns the raw
//! per-test-case records returned by a grader into a [`GradingReport`]: validated outcomes,
//! pass/fail counts, a weighted score, the dominant failure category, a summary message and
//! per-test-case feedback that never leaks hidden test data.
//!
//! ## Key Concepts
//! - **GradingJob**: The main struct representing the grading of one Run or Submit round.
//! - **Parsers**: Boundary validation from loosely-typed grader records into [`TestCaseOutcome`].
//! - **Feedback**: Pluggable strategies for per-test-case detail, defaulting to redaction of
//!   hidden test cases.
//! - **Reports**: Structured output summarizing the round.

pub mod error;
pub mod feedback;
pub mod parsers;
pub mod report;
pub mod scorer;
pub mod traits;
pub mod types;
pub mod utilities;
pub mod verdict;

use crate::error::GradingError;
use crate::feedback::redacting_feedback::RedactingFeedback;
use crate::feedback::summary::summary_message;
use crate::parsers::outcome_parser::{OutcomeParser, RawOutcome};
use crate::report::{GradingReport, VisibilityBreakdown};
use crate::traits::feedback::Feedback;
use crate::traits::parser::Parser;
use crate::types::{GradingMode, TestCaseOutcome, Visibility};

/// Represents the grading of a single Run or Submit round.
///
/// # Fields
/// - `mode`: Run considers public test cases only; Submit considers all of them.
/// - `outcomes`: Validated outcomes, in grader order.
/// - `feedback`: Strategy producing the per-test-case detail lines.
pub struct GradingJob<'a> {
    mode: GradingMode,
    outcomes: Vec<TestCaseOutcome>,
    feedback: Box<dyn Feedback + Send + Sync + 'a>,
}

impl<'a> GradingJob<'a> {
    pub fn new(mode: GradingMode, outcomes: Vec<TestCaseOutcome>) -> Self {
        Self {
            mode,
            outcomes,
            feedback: Box::new(RedactingFeedback),
        }
    }

    /// Validates raw grader records and builds a job from them.
    ///
    /// # Errors
    /// [`GradingError::MalformedOutcome`] for the first record that cannot be validated.
    pub fn from_raw(mode: GradingMode, raw: Vec<RawOutcome>) -> Result<Self, GradingError> {
        let outcomes = OutcomeParser.parse(raw)?;
        Ok(Self::new(mode, outcomes))
    }

    /// Set a custom feedback strategy for this grading job.
    pub fn with_feedback<F: Feedback + Send + Sync + 'a>(mut self, feedback: F) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    /// Aggregates the outcomes in scope into a report.
    ///
    /// # Steps
    /// 1. Filters to public outcomes in Run mode.
    /// 2. Counts passes and failures, per visibility for submissions.
    /// 3. Computes the weighted score.
    /// 4. Tallies failures and picks the dominant category.
    /// 5. Builds the summary message and the per-test-case feedback.
    pub fn grade(self) -> GradingReport {
        let in_scope: Vec<TestCaseOutcome> = match self.mode {
            GradingMode::Run => self
                .outcomes
                .into_iter()
                .filter(|o| o.visibility == Visibility::Public)
                .collect(),
            GradingMode::Submit => self.outcomes,
        };

        let total_count = in_scope.len();
        let passed_count = in_scope.iter().filter(|o| o.passed).count();
        let failed_count = total_count - passed_count;

        let (public, hidden) = match self.mode {
            GradingMode::Run => (None, None),
            GradingMode::Submit => (
                Some(breakdown(&in_scope, Visibility::Public)),
                Some(breakdown(&in_scope, Visibility::Hidden)),
            ),
        };

        let score = scorer::compute_score(&in_scope);
        let failure_counts = verdict::tally_failures(&in_scope);
        let dominant = verdict::dominant(&failure_counts);

        let mut report = GradingReport {
            mode: self.mode,
            total_count,
            passed_count,
            failed_count,
            public,
            hidden,
            earned_weight: score.earned_weight,
            total_weight: score.total_weight,
            score: score.score,
            success: total_count > 0 && failed_count == 0,
            dominant_failure: dominant.map(|f| f.status),
            failure_counts,
            message: String::new(),
            details: self.feedback.assemble_feedback(&in_scope),
        };
        report.message = summary_message(
            self.mode,
            total_count,
            passed_count,
            dominant,
            &report.score_label(),
        );

        tracing::debug!(
            mode = %report.mode,
            total = report.total_count,
            passed = report.passed_count,
            score = report.score,
            "Grading round aggregated"
        );
        report
    }
}

fn breakdown(outcomes: &[TestCaseOutcome], visibility: Visibility) -> VisibilityBreakdown {
    let of_kind = outcomes.iter().filter(|o| o.visibility == visibility);
    VisibilityBreakdown {
        count: of_kind.clone().count(),
        passed: of_kind.filter(|o| o.passed).count(),
    }
}
