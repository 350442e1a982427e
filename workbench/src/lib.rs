//! # Workbench
//!
//! The host-facing side of the code-practice workbench: problems and their test cases, the
//! grader client, the Run/Submit orchestrator and the editor session tying them to the
//! local code cache.
//!
//! ## Key Concepts
//! - **Orchestrator**: drives one grading round per problem at a time and turns grader
//!   records into a [`GradingReport`](marker::report::GradingReport).
//! - **Grader**: the remote execution service, behind a trait so tests can mock it.
//! - **WorkbenchSession**: one editor session owning the cache store, debounced writer,
//!   expiry sweeper and orchestrator.

pub mod error;
pub mod grader;
pub mod orchestrator;
pub mod problem;
pub mod session;

pub use error::WorkbenchError;
pub use grader::{GradeRequest, Grader, GraderError};
pub use orchestrator::{Orchestrator, RoundOutcome, RoundState};
pub use problem::{Problem, ProblemProvider, StaticProblemProvider, TestCase};
pub use session::{OpenedEditor, SessionSettings, WorkbenchSession};
