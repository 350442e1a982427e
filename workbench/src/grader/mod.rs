//! # Grader Client
//!
//! The grader is the remote service that compiles and executes submitted code against a
//! problem's test cases. It answers with one loosely-typed record per test case, which the
//! orchestrator validates through [`marker`].
//!
//! - [`http`]: the reqwest-backed client.

pub mod http;

pub use http::HttpGrader;

use async_trait::async_trait;
use marker::parsers::outcome_parser::RawOutcome;
use marker::types::GradingMode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use util::languages::Language;

/// What is sent to the grader for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeRequest {
    pub problem_id: String,
    pub code: String,
    pub language: Language,
    /// Judge0 language id of `language`.
    pub language_id: u32,
    pub mode: GradingMode,
}

impl GradeRequest {
    pub fn new(
        problem_id: impl Into<String>,
        code: impl Into<String>,
        language: Language,
        mode: GradingMode,
    ) -> Self {
        Self {
            problem_id: problem_id.into(),
            code: code.into(),
            language,
            language_id: language.judge0_id(),
            mode,
        }
    }
}

#[derive(Debug, Error)]
pub enum GraderError {
    #[error("grader unreachable: {0}")]
    Transport(String),

    #[error("grader did not answer within {0:?}")]
    Timeout(Duration),

    #[error("grader answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed grader payload: {0}")]
    MalformedPayload(String),
}

/// Remote code execution and judging.
#[async_trait]
pub trait Grader: Send + Sync {
    async fn grade(&self, request: &GradeRequest) -> Result<Vec<RawOutcome>, GraderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_the_judge0_language_id() {
        let request = GradeRequest::new("p", "print(1)", Language::Python, GradingMode::Run);
        assert_eq!(request.language_id, 71);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["language"], "python");
        assert_eq!(value["mode"], "run");
    }
}
