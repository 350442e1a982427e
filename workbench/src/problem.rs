//! Problems, their test cases and where they come from.

use crate::error::WorkbenchError;
use async_trait::async_trait;
use marker::types::Visibility;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use util::languages::Language;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub visibility: Visibility,
    #[serde(default)]
    pub stdin: String,
    #[serde(default)]
    pub expected_output: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl TestCase {
    pub fn public(stdin: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            visibility: Visibility::Public,
            stdin: stdin.into(),
            expected_output: expected_output.into(),
            weight: 1.0,
        }
    }

    pub fn hidden(stdin: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            visibility: Visibility::Hidden,
            ..Self::public(stdin, expected_output)
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Starter code per language. Languages without an entry start empty.
    #[serde(default)]
    pub starter_code: HashMap<Language, String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

impl Problem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            starter_code: HashMap::new(),
            test_cases: Vec::new(),
        }
    }

    pub fn with_starter(mut self, language: Language, code: impl Into<String>) -> Self {
        self.starter_code.insert(language, code.into());
        self
    }

    pub fn with_test_case(mut self, test_case: TestCase) -> Self {
        self.test_cases.push(test_case);
        self
    }

    pub fn starter_for(&self, language: Language) -> &str {
        self.starter_code.get(&language).map(String::as_str).unwrap_or("")
    }

    pub fn public_count(&self) -> usize {
        self.test_cases
            .iter()
            .filter(|tc| tc.visibility == Visibility::Public)
            .count()
    }
}

/// Source of problem definitions.
#[async_trait]
pub trait ProblemProvider: Send + Sync {
    async fn fetch_problem(&self, id: &str) -> Result<Problem, WorkbenchError>;
}

/// In-memory provider, for tests and for hosts that load problems up front.
#[derive(Debug, Default)]
pub struct StaticProblemProvider {
    problems: RwLock<HashMap<String, Problem>>,
}

impl StaticProblemProvider {
    pub fn new(problems: impl IntoIterator<Item = Problem>) -> Self {
        Self {
            problems: RwLock::new(problems.into_iter().map(|p| (p.id.clone(), p)).collect()),
        }
    }

    pub fn insert(&self, problem: Problem) {
        self.problems
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(problem.id.clone(), problem);
    }
}

#[async_trait]
impl ProblemProvider for StaticProblemProvider {
    async fn fetch_problem(&self, id: &str) -> Result<Problem, WorkbenchError> {
        self.problems
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| WorkbenchError::ProblemNotFound(id.to_string()))
    }
}
