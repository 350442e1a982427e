//! Verdict messages shown above the per-test-case details.

use crate::types::{GradingMode, OutcomeStatus};
use crate::verdict::FailureCount;

/// Shown when a run has no public test cases to execute.
pub const NO_PUBLIC_TEST_CASES: &str = "No public test cases are available to run against.";
/// Shown when a problem has no test cases at all.
pub const NO_TEST_CASES: &str = "No test cases are configured for this problem.";

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Builds the one-line summary of a round.
///
/// `score_label` is appended for submissions so the message carries the final
/// score; runs are about quick feedback and omit it.
pub fn summary_message(
    mode: GradingMode,
    total: usize,
    passed: usize,
    dominant: Option<FailureCount>,
    score_label: &str,
) -> String {
    if total == 0 {
        return match mode {
            GradingMode::Run => NO_PUBLIC_TEST_CASES.to_string(),
            GradingMode::Submit => NO_TEST_CASES.to_string(),
        };
    }

    let headline = match dominant {
        None => match mode {
            GradingMode::Run => format!("All {total} public test case{} passed.", plural(total)),
            GradingMode::Submit => format!("Accepted: all {total} test case{} passed.", plural(total)),
        },
        Some(FailureCount { status, count }) => match status {
            OutcomeStatus::WrongAnswer | OutcomeStatus::Accepted => {
                format!("Wrong answer: {passed} of {total} test case{} passed.", plural(total))
            }
            OutcomeStatus::TimeLimitExceeded => format!(
                "Time limit exceeded on {count} test case{}. Consider a more efficient approach.",
                plural(count)
            ),
            OutcomeStatus::CompilationError => {
                "Compilation error: fix the errors reported by the compiler and try again."
                    .to_string()
            }
            OutcomeStatus::RuntimeError => format!(
                "Runtime error on {count} test case{}. Check for crashes and unhandled exceptions.",
                plural(count)
            ),
            OutcomeStatus::MemoryError => format!(
                "Memory limit exceeded on {count} test case{}.",
                plural(count)
            ),
            OutcomeStatus::InternalError => format!(
                "The grader hit an internal error on {count} test case{}. Please try again.",
                plural(count)
            ),
        },
    };

    match mode {
        GradingMode::Run => headline,
        GradingMode::Submit => format!("{headline} Score: {score_label}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rounds_are_informational() {
        assert_eq!(summary_message(GradingMode::Run, 0, 0, None, "N/A"), NO_PUBLIC_TEST_CASES);
        assert_eq!(summary_message(GradingMode::Submit, 0, 0, None, "N/A"), NO_TEST_CASES);
    }

    #[test]
    fn success_messages() {
        assert_eq!(
            summary_message(GradingMode::Run, 1, 1, None, "100.00%"),
            "All 1 public test case passed."
        );
        assert_eq!(
            summary_message(GradingMode::Submit, 4, 4, None, "100.00%"),
            "Accepted: all 4 test cases passed. Score: 100.00%"
        );
    }

    #[test]
    fn failure_message_follows_dominant_category() {
        let wa = FailureCount { status: OutcomeStatus::WrongAnswer, count: 2 };
        assert_eq!(
            summary_message(GradingMode::Run, 3, 1, Some(wa), "33.33%"),
            "Wrong answer: 1 of 3 test cases passed."
        );

        let tle = FailureCount { status: OutcomeStatus::TimeLimitExceeded, count: 1 };
        let msg = summary_message(GradingMode::Submit, 5, 4, Some(tle), "80.00%");
        assert!(msg.starts_with("Time limit exceeded on 1 test case."));
        assert!(msg.ends_with("Score: 80.00%"));
    }
}
