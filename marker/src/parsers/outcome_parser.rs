//!
//! Outcome Parser Module
//!
//! Graders are not consistent about how they describe a test case result: flags arrive as
//! strings, numbers as strings, statuses as tags, descriptions, abbreviations or Judge0
//! status objects. [`RawOutcome`] accepts all of that, and [`OutcomeParser`] validates it
//! into [`TestCaseOutcome`]s once, at the boundary.
//!
//! # Rules
//!
//! - A missing `passed` flag is derived from the status, a missing status from `passed`.
//! - `passed == true` forces `Accepted`; `passed == false` with `Accepted` becomes `WrongAnswer`.
//! - Weight defaults to 1.0; negative, non-finite or non-numeric weights are malformed.
//! - Visibility defaults to hidden, so an incomplete record never leaks its data.
//! - Invalid metrics are dropped to `None`, never rejected.
//! - A missing index defaults to the record's position in the payload.

use crate::error::GradingError;
use crate::traits::parser::Parser;
use crate::types::{Metrics, OutcomeStatus, TestCaseOutcome, Visibility, is_valid_metric};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A per-test-case record exactly as a grader sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOutcome {
    #[serde(default, alias = "test_case_index", alias = "testCaseIndex")]
    pub index: Option<Value>,
    #[serde(default)]
    pub visibility: Option<Value>,
    #[serde(default, alias = "isHidden", alias = "hidden")]
    pub is_hidden: Option<Value>,
    #[serde(default)]
    pub passed: Option<Value>,
    #[serde(default)]
    pub weight: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default, alias = "time_secs", alias = "execution_time")]
    pub time: Option<Value>,
    #[serde(default, alias = "memory_kb", alias = "memory_usage")]
    pub memory: Option<Value>,
    #[serde(default, alias = "input")]
    pub stdin: Option<String>,
    #[serde(default, alias = "expected", alias = "expectedOutput")]
    pub expected_output: Option<String>,
    #[serde(default, alias = "stdout", alias = "actual", alias = "actualOutput")]
    pub actual_output: Option<String>,
    #[serde(default, alias = "stderr", alias = "compile_output", alias = "error")]
    pub message: Option<String>,
}

/// Validates grader records into outcomes, failing on the first malformed one.
pub struct OutcomeParser;

impl Parser<Vec<RawOutcome>, Vec<TestCaseOutcome>> for OutcomeParser {
    fn parse(&self, input: Vec<RawOutcome>) -> Result<Vec<TestCaseOutcome>, GradingError> {
        input
            .into_iter()
            .enumerate()
            .map(|(position, raw)| raw.validate(position))
            .collect()
    }
}

impl<'a> Parser<&'a Value, Vec<TestCaseOutcome>> for OutcomeParser {
    /// Accepts either a bare array of records or an object wrapping one under
    /// `results`.
    fn parse(&self, input: &'a Value) -> Result<Vec<TestCaseOutcome>, GradingError> {
        let records = match input {
            Value::Array(_) => input,
            Value::Object(map) => map
                .get("results")
                .ok_or_else(|| GradingError::InvalidJson("missing 'results' array".into()))?,
            _ => return Err(GradingError::InvalidJson("expected an array of results".into())),
        };
        let raw: Vec<RawOutcome> = serde_json::from_value(records.clone())
            .map_err(|e| GradingError::InvalidJson(e.to_string()))?;
        self.parse(raw)
    }
}

impl RawOutcome {
    /// The test case index this record refers to: its `index` field, numeric or
    /// numeric string, or `position` when absent. `None` when the field is present
    /// but not a non-negative integer.
    pub fn resolved_index(&self, position: usize) -> Option<usize> {
        match &self.index {
            None => Some(position),
            Some(value) => as_number(value)
                .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0)
                .map(|n| n as usize),
        }
    }

    /// Validates this record; `position` is its place in the payload.
    pub fn validate(self, position: usize) -> Result<TestCaseOutcome, GradingError> {
        let malformed = |reason: String| GradingError::MalformedOutcome {
            index: position,
            reason,
        };

        let index = self.resolved_index(position).ok_or_else(|| {
            malformed(format!("invalid index {}", self.index.clone().unwrap_or_default()))
        })?;

        let passed = match &self.passed {
            None => None,
            Some(value) => Some(
                as_bool(value).ok_or_else(|| malformed(format!("invalid passed flag {value}")))?,
            ),
        };

        let status = match &self.status {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                parse_status(value).ok_or_else(|| malformed(format!("unknown status {value}")))?,
            ),
        };

        let (passed, status) = match (passed, status) {
            (Some(true), _) => (true, OutcomeStatus::Accepted),
            (Some(false), Some(OutcomeStatus::Accepted) | None) => {
                (false, OutcomeStatus::WrongAnswer)
            }
            (Some(false), Some(status)) => (false, status),
            (None, Some(status)) => (status == OutcomeStatus::Accepted, status),
            (None, None) => return Err(malformed("neither a status nor a passed flag".into())),
        };

        let weight = match &self.weight {
            None | Some(Value::Null) => 1.0,
            Some(value) => as_number(value)
                .filter(|w| is_valid_metric(*w))
                .ok_or_else(|| malformed(format!("invalid weight {value}")))?,
        };

        let visibility = self.resolve_visibility();

        let metrics = Metrics::new(
            self.time.as_ref().and_then(as_metric),
            self.memory.as_ref().and_then(as_metric),
        );
        if metrics.time_secs.is_none() && self.time.as_ref().is_some_and(|v| !v.is_null()) {
            tracing::debug!(index, value = ?self.time, "Dropping invalid time metric");
        }
        if metrics.memory_kb.is_none() && self.memory.as_ref().is_some_and(|v| !v.is_null()) {
            tracing::debug!(index, value = ?self.memory, "Dropping invalid memory metric");
        }

        Ok(TestCaseOutcome {
            index,
            visibility,
            passed,
            weight,
            status,
            metrics,
            stdin: self.stdin,
            expected_output: self.expected_output,
            actual_output: self.actual_output,
            message: self.message.filter(|m| !m.trim().is_empty()),
        })
    }

    fn resolve_visibility(&self) -> Visibility {
        if let Some(Value::String(s)) = &self.visibility {
            match s.trim().to_ascii_lowercase().as_str() {
                "public" | "visible" | "sample" => return Visibility::Public,
                "hidden" | "private" => return Visibility::Hidden,
                _ => {}
            }
        }
        match self.is_hidden.as_ref().and_then(as_bool) {
            Some(false) => Visibility::Public,
            _ => Visibility::Hidden,
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_metric(value: &Value) -> Option<f64> {
    as_number(value).filter(|v| is_valid_metric(*v))
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn parse_status(value: &Value) -> Option<OutcomeStatus> {
    match value {
        Value::String(s) => OutcomeStatus::parse_loose(s),
        Value::Number(n) => n.as_u64().and_then(OutcomeStatus::from_judge0_id),
        // Judge0 shape: {"id": 4, "description": "Wrong Answer"}
        Value::Object(map) => map
            .get("id")
            .and_then(Value::as_u64)
            .and_then(OutcomeStatus::from_judge0_id)
            .or_else(|| {
                map.get("description")
                    .and_then(Value::as_str)
                    .and_then(OutcomeStatus::parse_loose)
            }),
        _ => None,
    }
}
