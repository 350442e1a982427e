#![allow(dead_code)]

use async_trait::async_trait;
use code_cache::{DebouncedWriter, MemoryStorage, TtlCacheStore};
use marker::parsers::outcome_parser::RawOutcome;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use util::clock::ManualClock;
use workbench::grader::http::parse_payload;
use workbench::problem::{Problem, StaticProblemProvider, TestCase};
use workbench::{GradeRequest, Grader, GraderError, Orchestrator};

pub const NS: &str = "code-cache:";
pub const SIX_HOURS: Duration = Duration::from_secs(6 * 3600);
pub const QUIET: Duration = Duration::from_secs(2);
pub const GRADER_TIMEOUT: Duration = Duration::from_secs(5);

pub enum Behaviour {
    Respond(Value),
    Status(u16),
    /// Never answers within any reasonable deadline.
    Hang,
    /// Answers once the gate is opened.
    Gated(Arc<Notify>, Value),
}

pub struct MockGrader {
    behaviour: Behaviour,
    calls: AtomicUsize,
    requests: Mutex<Vec<GradeRequest>>,
}

impl MockGrader {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GradeRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Grader for MockGrader {
    async fn grade(&self, request: &GradeRequest) -> Result<Vec<RawOutcome>, GraderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        match &self.behaviour {
            Behaviour::Respond(body) => parse_payload(&body.to_string()),
            Behaviour::Status(status) => Err(GraderError::Status {
                status: *status,
                body: "grader exploded".into(),
            }),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GraderError::Transport("gave up".into()))
            }
            Behaviour::Gated(gate, body) => {
                gate.notified().await;
                parse_payload(&body.to_string())
            }
        }
    }
}

pub struct Fixture {
    pub storage: Arc<MemoryStorage>,
    pub clock: ManualClock,
    pub store: Arc<TtlCacheStore>,
    pub problems: Arc<StaticProblemProvider>,
}

impl Fixture {
    pub fn new(problems: impl IntoIterator<Item = Problem>) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let clock = ManualClock::at_epoch();
        let store = Arc::new(TtlCacheStore::new(
            storage.clone(),
            Arc::new(clock.clone()),
            NS,
            SIX_HOURS,
        ));
        Self {
            storage,
            clock,
            store,
            problems: Arc::new(StaticProblemProvider::new(problems)),
        }
    }

    pub fn orchestrator(&self, grader: Arc<MockGrader>) -> Orchestrator {
        Orchestrator::new(
            self.problems.clone(),
            grader,
            DebouncedWriter::new(self.store.clone(), QUIET),
            GRADER_TIMEOUT,
        )
    }
}

/// Three public test cases.
pub fn sum_problem() -> Problem {
    Problem::new("sum")
        .with_starter(util::languages::Language::Python, "# write your solution\n")
        .with_test_case(TestCase::public("1 2", "3"))
        .with_test_case(TestCase::public("2 2", "4"))
        .with_test_case(TestCase::public("0 0", "0"))
}

/// Two public and two hidden test cases.
pub fn mixed_problem() -> Problem {
    Problem::new("mixed")
        .with_test_case(TestCase::public("a", "A"))
        .with_test_case(TestCase::public("b", "B"))
        .with_test_case(TestCase::hidden("SECRET-1", "HIDDEN-1"))
        .with_test_case(TestCase::hidden("SECRET-2", "HIDDEN-2"))
}

/// Only hidden test cases.
pub fn hidden_only_problem() -> Problem {
    Problem::new("hidden-only").with_test_case(TestCase::hidden("x", "y"))
}
