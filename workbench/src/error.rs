use code_cache::CacheError;
use thiserror::Error;

/// Errors surfaced to the host by the orchestrator and the editor session.
///
/// Grader failures are not errors at this level: they end the round with
/// [`RoundOutcome::Failed`](crate::orchestrator::RoundOutcome::Failed).
#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("a grading round is already in flight for problem '{0}'")]
    RoundInFlight(String),

    #[error("problem '{0}' not found")]
    ProblemNotFound(String),

    #[error("problem provider failed: {0}")]
    Provider(String),

    #[error("no editor is open")]
    NoActiveEditor,

    #[error(transparent)]
    Cache(#[from] CacheError),
}
