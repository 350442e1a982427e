//! # Scorer Module
//!
//! Weighted scoring of a grading round. Every outcome in scope contributes its weight to the
//! denominator; passing outcomes also contribute it to the numerator.

use crate::types::TestCaseOutcome;
use serde::Serialize;

/// Weighted totals for one round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub earned_weight: f64,
    pub total_weight: f64,
    /// Percentage in `[0, 100]`, rounded to two decimals. `0.0` when the
    /// total weight is zero; see [`ScoreSummary::is_applicable`].
    pub score: f64,
}

impl ScoreSummary {
    /// A round without any weight has no meaningful score.
    pub fn is_applicable(&self) -> bool {
        self.total_weight > 0.0
    }
}

/// Round a float to two decimal places.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Computes the weighted score of `outcomes`.
///
/// # Example
///
/// ```
/// use marker::scorer::compute_score;
/// use marker::types::{OutcomeStatus, TestCaseOutcome, Visibility};
///
/// let outcomes = vec![
///     TestCaseOutcome::new(0, Visibility::Public, OutcomeStatus::Accepted),
///     TestCaseOutcome::new(1, Visibility::Public, OutcomeStatus::WrongAnswer),
///     TestCaseOutcome::new(2, Visibility::Public, OutcomeStatus::WrongAnswer),
/// ];
///
/// let summary = compute_score(&outcomes);
/// assert_eq!(summary.score, 33.33);
///
/// // No outcomes, no score.
/// assert!(!compute_score(&[]).is_applicable());
/// ```
pub fn compute_score(outcomes: &[TestCaseOutcome]) -> ScoreSummary {
    let mut earned_weight = 0.0;
    let mut total_weight = 0.0;

    for outcome in outcomes {
        total_weight += outcome.weight;
        if outcome.passed {
            earned_weight += outcome.weight;
        }
    }

    let score = if total_weight > 0.0 {
        round2(100.0 * earned_weight / total_weight)
    } else {
        0.0
    };

    ScoreSummary {
        earned_weight,
        total_weight,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OutcomeStatus, Visibility};

    fn pass(weight: f64) -> TestCaseOutcome {
        TestCaseOutcome::new(0, Visibility::Public, OutcomeStatus::Accepted).with_weight(weight)
    }

    fn fail(weight: f64) -> TestCaseOutcome {
        TestCaseOutcome::new(0, Visibility::Hidden, OutcomeStatus::WrongAnswer).with_weight(weight)
    }

    #[test]
    fn weights_are_respected() {
        let summary = compute_score(&[pass(3.0), fail(1.0)]);
        assert_eq!(summary.earned_weight, 3.0);
        assert_eq!(summary.total_weight, 4.0);
        assert_eq!(summary.score, 75.0);
    }

    #[test]
    fn empty_round_is_not_applicable_and_does_not_divide_by_zero() {
        let summary = compute_score(&[]);
        assert_eq!(summary.score, 0.0);
        assert!(!summary.is_applicable());
    }

    #[test]
    fn zero_weight_round_scores_zero() {
        let summary = compute_score(&[pass(0.0), pass(0.0)]);
        assert_eq!(summary.score, 0.0);
        assert!(!summary.is_applicable());
    }

    #[test]
    fn adding_a_pass_never_lowers_the_score() {
        let mut outcomes = vec![fail(1.0), pass(2.0), fail(0.5)];
        for weight in [0.1, 1.0, 7.0] {
            let before = compute_score(&outcomes).score;
            outcomes.push(pass(weight));
            assert!(compute_score(&outcomes).score >= before);
        }
    }

    #[test]
    fn adding_a_failure_never_raises_the_score() {
        let mut outcomes = vec![pass(1.0), pass(2.0), fail(0.5)];
        for weight in [0.1, 1.0, 7.0] {
            let before = compute_score(&outcomes).score;
            outcomes.push(fail(weight));
            assert!(compute_score(&outcomes).score <= before);
        }
    }

    #[test]
    fn rounds_to_two_decimals() {
        let summary = compute_score(&[pass(2.0), fail(1.0)]);
        assert_eq!(summary.score, 66.67);
    }
}
