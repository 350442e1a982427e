//! # Run/Submit Orchestrator
//!
//! One grading round per problem at a time:
//!
//! ```text
//! Idle -> Requesting -> Completed
//!                    -> Failed
//! ```
//!
//! A round persists the current code first, so nothing typed is lost whatever happens
//! next. It then fetches the problem, short-circuits when there is nothing to grade, sends
//! the code to the grader under a deadline and aggregates the answer with [`GradingJob`].
//! Grader trouble of any kind ends the round as [`RoundOutcome::Failed`]; there is no
//! automatic retry.

use crate::error::WorkbenchError;
use crate::grader::{GradeRequest, Grader, GraderError};
use crate::problem::{Problem, ProblemProvider};
use code_cache::{CacheKey, DebouncedWriter};
use marker::GradingJob;
use marker::feedback::summary::{NO_PUBLIC_TEST_CASES, NO_TEST_CASES};
use marker::parsers::outcome_parser::RawOutcome;
use marker::report::GradingReport;
use marker::types::GradingMode;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use util::config::AppConfig;
use util::languages::Language;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundState {
    #[default]
    Idle,
    Requesting,
    Completed,
    Failed,
}

#[derive(Debug)]
pub enum RoundOutcome {
    /// The grader answered and the answer was aggregated.
    Completed { report: GradingReport },
    /// Nothing to grade; the grader was not contacted.
    NoTestCases { report: GradingReport },
    Failed { message: String, error: GraderError },
}

impl RoundOutcome {
    /// The message to show the user.
    pub fn message(&self) -> &str {
        match self {
            RoundOutcome::Completed { report } | RoundOutcome::NoTestCases { report } => {
                &report.message
            }
            RoundOutcome::Failed { message, .. } => message,
        }
    }

    pub fn report(&self) -> Option<&GradingReport> {
        match self {
            RoundOutcome::Completed { report } | RoundOutcome::NoTestCases { report } => {
                Some(report)
            }
            RoundOutcome::Failed { .. } => None,
        }
    }
}

fn failure_message(mode: GradingMode) -> String {
    match mode {
        GradingMode::Run => "Failed to run your code. Please try again.".to_string(),
        GradingMode::Submit => "Failed to submit your code. Please try again.".to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Marks a problem as `Requesting` while alive. Back to `Idle` on drop unless
/// finished, so an abandoned round never blocks the next one.
struct RoundGuard<'a> {
    rounds: &'a Mutex<HashMap<String, RoundState>>,
    problem_id: String,
    finished: bool,
}

impl<'a> RoundGuard<'a> {
    fn acquire(
        rounds: &'a Mutex<HashMap<String, RoundState>>,
        problem_id: &str,
    ) -> Result<Self, WorkbenchError> {
        let mut states = lock(rounds);
        if states.get(problem_id) == Some(&RoundState::Requesting) {
            return Err(WorkbenchError::RoundInFlight(problem_id.to_string()));
        }
        states.insert(problem_id.to_string(), RoundState::Requesting);
        Ok(Self {
            rounds,
            problem_id: problem_id.to_string(),
            finished: false,
        })
    }

    fn finish(mut self, state: RoundState) {
        lock(self.rounds).insert(self.problem_id.clone(), state);
        self.finished = true;
    }
}

impl Drop for RoundGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            lock(self.rounds).insert(self.problem_id.clone(), RoundState::Idle);
            tracing::debug!(problem = %self.problem_id, "Grading round abandoned");
        }
    }
}

pub struct Orchestrator {
    problems: Arc<dyn ProblemProvider>,
    grader: Arc<dyn Grader>,
    writer: DebouncedWriter,
    timeout: Duration,
    rounds: Mutex<HashMap<String, RoundState>>,
    reports: Mutex<HashMap<(String, GradingMode), GradingReport>>,
}

impl Orchestrator {
    /// `timeout` bounds the whole grader round-trip, on top of whatever the
    /// grader's own transport enforces.
    pub fn new(
        problems: Arc<dyn ProblemProvider>,
        grader: Arc<dyn Grader>,
        writer: DebouncedWriter,
        timeout: Duration,
    ) -> Self {
        Self {
            problems,
            grader,
            writer,
            timeout,
            rounds: Mutex::default(),
            reports: Mutex::default(),
        }
    }

    pub fn from_config(
        problems: Arc<dyn ProblemProvider>,
        grader: Arc<dyn Grader>,
        writer: DebouncedWriter,
        config: &AppConfig,
    ) -> Self {
        Self::new(problems, grader, writer, config.grader_timeout())
    }

    pub fn round_state(&self, problem_id: &str) -> RoundState {
        lock(&self.rounds).get(problem_id).copied().unwrap_or_default()
    }

    /// The most recent report of a `mode` round for `problem_id`.
    pub fn last_report(&self, problem_id: &str, mode: GradingMode) -> Option<GradingReport> {
        lock(&self.reports)
            .get(&(problem_id.to_string(), mode))
            .cloned()
    }

    pub async fn run(
        &self,
        problem_id: &str,
        language: Language,
        code: &str,
    ) -> Result<RoundOutcome, WorkbenchError> {
        self.round(problem_id, language, code, GradingMode::Run).await
    }

    pub async fn submit(
        &self,
        problem_id: &str,
        language: Language,
        code: &str,
    ) -> Result<RoundOutcome, WorkbenchError> {
        self.round(problem_id, language, code, GradingMode::Submit).await
    }

    /// Executes one grading round.
    ///
    /// # Errors
    /// - [`WorkbenchError::RoundInFlight`] if a round for `problem_id` is still requesting.
    /// - [`WorkbenchError::ProblemNotFound`] / [`WorkbenchError::Provider`] from the provider.
    pub async fn round(
        &self,
        problem_id: &str,
        language: Language,
        code: &str,
        mode: GradingMode,
    ) -> Result<RoundOutcome, WorkbenchError> {
        let guard = RoundGuard::acquire(&self.rounds, problem_id)?;
        self.persist(CacheKey::new(problem_id, language), code);

        let problem = self.problems.fetch_problem(problem_id).await?;

        let in_scope = match mode {
            GradingMode::Run => problem.public_count(),
            GradingMode::Submit => problem.test_cases.len(),
        };
        if in_scope == 0 {
            let message = match mode {
                GradingMode::Run => NO_PUBLIC_TEST_CASES,
                GradingMode::Submit => NO_TEST_CASES,
            };
            tracing::info!(problem = problem_id, %mode, "No test cases to grade");
            let report = GradingReport::empty(mode, message);
            self.remember(problem_id, mode, &report);
            guard.finish(RoundState::Completed);
            return Ok(RoundOutcome::NoTestCases { report });
        }

        let request = GradeRequest::new(problem_id, code, language, mode);
        let answer = match tokio::time::timeout(self.timeout, self.grader.grade(&request)).await {
            Ok(answer) => answer,
            Err(_) => Err(GraderError::Timeout(self.timeout)),
        };

        let graded = answer.and_then(|raw| {
            let report = GradingJob::from_raw(mode, enrich(raw, &problem))
                .map(GradingJob::grade)
                .map_err(|e| GraderError::MalformedPayload(e.to_string()))?;
            // The problem has test cases in scope, so an empty answer is not informational.
            if report.total_count == 0 {
                return Err(GraderError::MalformedPayload("grader returned no results".into()));
            }
            Ok(report)
        });

        match graded {
            Ok(report) => {
                tracing::info!(
                    problem = problem_id,
                    %mode,
                    passed = report.passed_count,
                    total = report.total_count,
                    "Grading round completed"
                );
                self.remember(problem_id, mode, &report);
                guard.finish(RoundState::Completed);
                Ok(RoundOutcome::Completed { report })
            }
            Err(error) => {
                tracing::warn!(problem = problem_id, %mode, error = %error, "Grading round failed");
                guard.finish(RoundState::Failed);
                Ok(RoundOutcome::Failed {
                    message: failure_message(mode),
                    error,
                })
            }
        }
    }

    fn persist(&self, key: CacheKey, code: &str) {
        if self.writer.notify_change(key.clone(), code).is_some() {
            self.writer.flush(&key);
        }
    }

    fn remember(&self, problem_id: &str, mode: GradingMode, report: &GradingReport) {
        lock(&self.reports).insert((problem_id.to_string(), mode), report.clone());
    }
}

/// Fills in what the grader left out from the problem's own test cases,
/// matched by index.
fn enrich(mut raw: Vec<RawOutcome>, problem: &Problem) -> Vec<RawOutcome> {
    for (position, record) in raw.iter_mut().enumerate() {
        let Some(test_case) = record
            .resolved_index(position)
            .and_then(|index| problem.test_cases.get(index))
        else {
            continue;
        };

        if record.visibility.is_none() && record.is_hidden.is_none() {
            record.visibility = Some(Value::from(test_case.visibility.as_str()));
        }
        if record.weight.is_none() {
            record.weight = Some(Value::from(test_case.weight));
        }
        if record.stdin.is_none() {
            record.stdin = Some(test_case.stdin.clone());
        }
        if record.expected_output.is_none() {
            record.expected_output = Some(test_case.expected_output.clone());
        }
    }
    raw
}
