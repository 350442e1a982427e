//! # Grading Report Module
//!
//! This module defines the data structures and response envelope for returning grading results
//! from the marker system.
//!
//! ## Overview
//!
//! - [`GradingReport`]: Counts, weighted score, failure classification, summary message and
//!   per-test-case feedback for one grading round.
//! - [`GradingResponse`]: A response envelope that wraps a [`GradingReport`] with success and
//!   message fields for presentation-layer JSON.
//!
//! ## JSON Output Example
//!
//! ```json
//! {
//!   "success": false,
//!   "message": "Wrong answer: 1 of 3 test cases passed.",
//!   "data": {
//!     "mode": "run",
//!     "total_count": 3,
//!     "passed_count": 1,
//!     "failed_count": 2,
//!     "score": 33.33,
//!     "dominant_failure": "wrong_answer",
//!     "details": [ ... ]
//!   }
//! }
//! ```
//!
//! A report is built once by [`GradingJob::grade`](crate::GradingJob::grade) and never mutated.

use crate::traits::feedback::FeedbackEntry;
use crate::types::{GradingMode, OutcomeStatus};
use crate::utilities::format::NOT_AVAILABLE;
use crate::verdict::FailureCount;
use serde::Serialize;

/// Pass counts for one visibility class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityBreakdown {
    pub count: usize,
    pub passed: usize,
}

/// The aggregated result of one Run or Submit round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingReport {
    pub mode: GradingMode,
    pub total_count: usize,
    pub passed_count: usize,
    pub failed_count: usize,
    /// Only present for submissions.
    pub public: Option<VisibilityBreakdown>,
    /// Only present for submissions.
    pub hidden: Option<VisibilityBreakdown>,
    pub earned_weight: f64,
    pub total_weight: f64,
    /// Percentage rounded to two decimals; `0.0` when there is no weight.
    pub score: f64,
    pub success: bool,
    pub dominant_failure: Option<OutcomeStatus>,
    /// Failing statuses in order of first occurrence.
    pub failure_counts: Vec<FailureCount>,
    pub message: String,
    pub details: Vec<FeedbackEntry>,
}

impl GradingReport {
    /// A report for a round with nothing to grade.
    pub fn empty(mode: GradingMode, message: impl Into<String>) -> Self {
        let breakdown = match mode {
            GradingMode::Run => None,
            GradingMode::Submit => Some(VisibilityBreakdown::default()),
        };
        Self {
            mode,
            total_count: 0,
            passed_count: 0,
            failed_count: 0,
            public: breakdown,
            hidden: breakdown,
            earned_weight: 0.0,
            total_weight: 0.0,
            score: 0.0,
            success: false,
            dominant_failure: None,
            failure_counts: Vec::new(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// `"66.67%"`, or `"N/A"` when no test case carried any weight.
    pub fn score_label(&self) -> String {
        if self.total_weight > 0.0 {
            format!("{:.2}%", self.score)
        } else {
            NOT_AVAILABLE.to_string()
        }
    }

    /// Plain-text rendering: the summary, the counts, then one block per test case.
    pub fn render_text(&self) -> String {
        let mut lines = vec![
            self.message.clone(),
            format!(
                "Passed {}/{} ({} failed) | score {}",
                self.passed_count,
                self.total_count,
                self.failed_count,
                self.score_label()
            ),
        ];

        if let (Some(public), Some(hidden)) = (self.public, self.hidden) {
            lines.push(format!(
                "Public {}/{} | Hidden {}/{}",
                public.passed, public.count, hidden.passed, hidden.count
            ));
        }

        lines.extend(self.details.iter().map(FeedbackEntry::render));
        lines.join("\n")
    }
}

/// The presentation-layer envelope for grading results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingResponse {
    pub success: bool,
    pub message: String,
    pub data: GradingReport,
}

impl From<GradingReport> for GradingResponse {
    fn from(report: GradingReport) -> Self {
        GradingResponse {
            success: report.success,
            message: report.message.clone(),
            data: report,
        }
    }
}
