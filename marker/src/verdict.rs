//! Failure classification.
//!
//! A round usually fails for one main reason. The dominant failure category is the status
//! seen most often among failing outcomes; a tie goes to the status that failed first in
//! outcome order, so the result never depends on hash ordering.

use crate::types::{OutcomeStatus, TestCaseOutcome};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FailureCount {
    pub status: OutcomeStatus,
    pub count: usize,
}

/// Failing statuses with their counts, in order of first occurrence.
pub fn tally_failures(outcomes: &[TestCaseOutcome]) -> Vec<FailureCount> {
    let mut tally: Vec<FailureCount> = Vec::new();
    for outcome in outcomes.iter().filter(|o| !o.passed) {
        match tally.iter_mut().find(|f| f.status == outcome.status) {
            Some(entry) => entry.count += 1,
            None => tally.push(FailureCount {
                status: outcome.status,
                count: 1,
            }),
        }
    }
    tally
}

/// The most frequent entry of a tally; earlier entries win ties.
pub fn dominant(tally: &[FailureCount]) -> Option<FailureCount> {
    tally.iter().fold(None, |best: Option<FailureCount>, candidate| match best {
        Some(b) if b.count >= candidate.count => Some(b),
        _ => Some(*candidate),
    })
}

pub fn dominant_failure(outcomes: &[TestCaseOutcome]) -> Option<OutcomeStatus> {
    dominant(&tally_failures(outcomes)).map(|f| f.status)
}
