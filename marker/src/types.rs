//! # Types Module
//!
//! This module defines the core data structures used throughout the marker system:
//! the grading mode, test case visibility, outcome statuses and validated
//! per-test-case outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which test cases a grading round covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingMode {
    /// Public test cases only, for quick feedback.
    Run,
    /// Every test case, for final scoring.
    Submit,
}

impl GradingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GradingMode::Run => "run",
            GradingMode::Submit => "submit",
        }
    }
}

impl fmt::Display for GradingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Hidden,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Hidden => "hidden",
        }
    }
}

/// Classification of a single test case execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    RuntimeError,
    MemoryError,
    InternalError,
}

impl OutcomeStatus {
    /// Human-readable name, as shown in reports.
    pub fn label(self) -> &'static str {
        match self {
            OutcomeStatus::Accepted => "Accepted",
            OutcomeStatus::WrongAnswer => "Wrong Answer",
            OutcomeStatus::TimeLimitExceeded => "Time Limit Exceeded",
            OutcomeStatus::CompilationError => "Compilation Error",
            OutcomeStatus::RuntimeError => "Runtime Error",
            OutcomeStatus::MemoryError => "Memory Limit Exceeded",
            OutcomeStatus::InternalError => "Internal Error",
        }
    }

    /// Parses the many spellings graders use for a status: snake_case tags,
    /// descriptions ("Wrong Answer"), abbreviations ("WA", "TLE") and the
    /// Runtime Error family ("Runtime Error (SIGSEGV)").
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
            .collect();
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

        let status = match normalized.as_str() {
            "accepted" | "ac" | "ok" | "passed" | "pass" | "success" => OutcomeStatus::Accepted,
            "wrong answer" | "wa" | "failed" | "fail" => OutcomeStatus::WrongAnswer,
            "time limit exceeded" | "tle" | "timeout" | "time limit" => {
                OutcomeStatus::TimeLimitExceeded
            }
            "compilation error" | "compile error" | "ce" => OutcomeStatus::CompilationError,
            "runtime error" | "re" => OutcomeStatus::RuntimeError,
            "memory limit exceeded" | "mle" | "memory error" | "out of memory" => {
                OutcomeStatus::MemoryError
            }
            "internal error" | "ie" | "system error" | "exec format error" => {
                OutcomeStatus::InternalError
            }
            other if other.starts_with("runtime error") => OutcomeStatus::RuntimeError,
            _ => return None,
        };
        Some(status)
    }

    /// Maps a Judge0 status id. Ids 1 and 2 (queued / processing) are not
    /// final verdicts and yield `None`.
    pub fn from_judge0_id(id: u64) -> Option<Self> {
        match id {
            3 => Some(OutcomeStatus::Accepted),
            4 => Some(OutcomeStatus::WrongAnswer),
            5 => Some(OutcomeStatus::TimeLimitExceeded),
            6 => Some(OutcomeStatus::CompilationError),
            7..=12 => Some(OutcomeStatus::RuntimeError),
            13 | 14 => Some(OutcomeStatus::InternalError),
            _ => None,
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Execution metrics. Only finite, non-negative values are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub time_secs: Option<f64>,
    pub memory_kb: Option<f64>,
}

impl Metrics {
    pub fn new(time_secs: Option<f64>, memory_kb: Option<f64>) -> Self {
        Self {
            time_secs: time_secs.filter(|v| is_valid_metric(*v)),
            memory_kb: memory_kb.filter(|v| is_valid_metric(*v)),
        }
    }
}

pub(crate) fn is_valid_metric(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// The validated outcome of one test case in one grading round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseOutcome {
    /// Ordinal position, stable within the round.
    pub index: usize,
    pub visibility: Visibility,
    pub passed: bool,
    /// Non-negative contribution to the score.
    pub weight: f64,
    pub status: OutcomeStatus,
    pub metrics: Metrics,
    pub stdin: Option<String>,
    pub expected_output: Option<String>,
    pub actual_output: Option<String>,
    /// Diagnostics such as stderr or compiler output.
    pub message: Option<String>,
}

impl TestCaseOutcome {
    /// Creates an outcome with weight 1.0 and no metrics or I/O. `passed` is
    /// derived from the status.
    pub fn new(index: usize, visibility: Visibility, status: OutcomeStatus) -> Self {
        Self {
            index,
            visibility,
            passed: status == OutcomeStatus::Accepted,
            weight: 1.0,
            status,
            metrics: Metrics::default(),
            stdin: None,
            expected_output: None,
            actual_output: None,
            message: None,
        }
    }

    /// Negative or non-finite weights are clamped to zero.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = if is_valid_metric(weight) { weight } else { 0.0 };
        self
    }

    pub fn with_metrics(mut self, time_secs: Option<f64>, memory_kb: Option<f64>) -> Self {
        self.metrics = Metrics::new(time_secs, memory_kb);
        self
    }

    pub fn with_io(
        mut self,
        stdin: impl Into<String>,
        expected_output: impl Into<String>,
        actual_output: impl Into<String>,
    ) -> Self {
        self.stdin = Some(stdin.into());
        self.expected_output = Some(expected_output.into());
        self.actual_output = Some(actual_output.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
