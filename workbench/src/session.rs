//! # Editor Session
//!
//! Host glue for one editor session. The session owns the cache store, the debounced
//! writer, the expiry sweeper and the orchestrator, and tracks which `(problem, language)`
//! editor is open together with its current code and starter code.
//!
//! Typical flow:
//!
//! 1. [`WorkbenchSession::open_editor`] restores a cached draft or falls back to the starter.
//! 2. [`WorkbenchSession::edit`] is called on every change; writes are debounced.
//! 3. [`WorkbenchSession::run`] / [`WorkbenchSession::submit`] grade the current code.
//! 4. [`WorkbenchSession::shutdown`] flushes pending writes and stops the sweeper.

use crate::error::WorkbenchError;
use crate::grader::Grader;
use crate::orchestrator::{Orchestrator, RoundOutcome};
use crate::problem::ProblemProvider;
use code_cache::storage::open_or_memory;
use code_cache::{
    CacheKey, CacheStatus, DebouncedWriter, ExpirySweeper, RemainingTtl, SaveStatus,
    SweeperHandle, TtlCacheStore,
};
use marker::types::GradingMode;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use util::config::AppConfig;
use util::languages::Language;

/// Timing knobs of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub quiet_period: Duration,
    pub sweep_interval: Duration,
    pub grader_timeout: Duration,
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            quiet_period: config.cache_debounce(),
            sweep_interval: config.cache_sweep_interval(),
            grader_timeout: config.grader_timeout(),
        }
    }
}

/// What the editor should display after opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedEditor {
    pub key: CacheKey,
    pub code: String,
    /// `true` when `code` came from the cache rather than the starter.
    pub restored: bool,
    pub remaining: Option<RemainingTtl>,
}

struct Editor {
    key: CacheKey,
    starter: String,
    code: String,
}

pub struct WorkbenchSession {
    store: Arc<TtlCacheStore>,
    writer: DebouncedWriter,
    sweeper: SweeperHandle,
    problems: Arc<dyn ProblemProvider>,
    orchestrator: Orchestrator,
    editor: Mutex<Option<Editor>>,
    closed: bool,
}

impl WorkbenchSession {
    /// Must be called from within a Tokio runtime; the sweeper starts right away.
    pub fn new(
        store: Arc<TtlCacheStore>,
        problems: Arc<dyn ProblemProvider>,
        grader: Arc<dyn Grader>,
        settings: SessionSettings,
    ) -> Self {
        let writer = DebouncedWriter::new(store.clone(), settings.quiet_period);
        let sweeper = ExpirySweeper::spawn(store.clone(), settings.sweep_interval);
        let orchestrator = Orchestrator::new(
            problems.clone(),
            grader,
            writer.clone(),
            settings.grader_timeout,
        );

        tracing::info!(namespace = store.namespace(), "Workbench session started");
        Self {
            store,
            writer,
            sweeper,
            problems,
            orchestrator,
            editor: Mutex::new(None),
            closed: false,
        }
    }

    /// Builds a session on the configured cache file, degrading to an
    /// in-memory cache if the file cannot be used.
    pub fn from_config(
        problems: Arc<dyn ProblemProvider>,
        grader: Arc<dyn Grader>,
        config: &AppConfig,
    ) -> Self {
        let storage = open_or_memory(&config.cache_file);
        let store = Arc::new(TtlCacheStore::from_config(storage, config));
        Self::new(store, problems, grader, SessionSettings::from(config))
    }

    fn editor(&self) -> MutexGuard<'_, Option<Editor>> {
        self.editor.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn store(&self) -> &Arc<TtlCacheStore> {
        &self.store
    }

    pub fn writer(&self) -> &DebouncedWriter {
        &self.writer
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheStatus> {
        self.writer.subscribe()
    }

    /// Opens the editor for `problem_id` in `language`, restoring a cached
    /// draft when one exists. The previously open editor's pending change is
    /// flushed.
    pub fn open_editor(&self, problem_id: &str, language: Language, starter: &str) -> OpenedEditor {
        let key = CacheKey::new(problem_id, language);

        let cached = match self.store.read(&key) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(%key, error = %e, "Could not read cached draft; using starter code");
                None
            }
        };

        self.writer.register_starter(key.clone(), starter);
        self.writer.switch_active(key.clone());

        let opened = match cached {
            Some(cached) => OpenedEditor {
                key: key.clone(),
                code: cached.code,
                restored: true,
                remaining: cached.remaining,
            },
            None => OpenedEditor {
                key: key.clone(),
                code: starter.to_string(),
                restored: false,
                remaining: None,
            },
        };

        *self.editor() = Some(Editor {
            key,
            starter: starter.to_string(),
            code: opened.code.clone(),
        });
        opened
    }

    /// Like [`open_editor`](Self::open_editor), with the starter code taken
    /// from the problem definition.
    pub async fn open_problem(
        &self,
        problem_id: &str,
        language: Language,
    ) -> Result<OpenedEditor, WorkbenchError> {
        let problem = self.problems.fetch_problem(problem_id).await?;
        Ok(self.open_editor(problem_id, language, problem.starter_for(language)))
    }

    /// Records an edit of the open editor. `None` when the code is back to
    /// the starter and therefore not cached.
    pub fn edit(&self, code: &str) -> Result<Option<SaveStatus>, WorkbenchError> {
        let key = {
            let mut editor = self.editor();
            let editor = editor.as_mut().ok_or(WorkbenchError::NoActiveEditor)?;
            editor.code = code.to_string();
            editor.key.clone()
        };
        Ok(self.writer.notify_change(key, code))
    }

    /// Current code of the open editor.
    pub fn code(&self) -> Option<String> {
        self.editor().as_ref().map(|editor| editor.code.clone())
    }

    /// Save indicator of the open editor; `None` until something was edited.
    pub fn cache_status(&self) -> Option<CacheStatus> {
        let key = self.editor().as_ref()?.key.clone();
        let status = self.writer.status(&key)?;
        let remaining = match status {
            SaveStatus::Saved => self
                .store
                .remaining(&key)
                .ok()
                .flatten()
                .map(|ttl| ttl.to_string()),
            SaveStatus::Saving | SaveStatus::Error => None,
        };
        Some(CacheStatus {
            key,
            status,
            remaining,
        })
    }

    /// Throws the draft away and returns the starter code.
    pub fn reset(&self) -> Result<String, WorkbenchError> {
        let (key, starter) = {
            let mut editor = self.editor();
            let editor = editor.as_mut().ok_or(WorkbenchError::NoActiveEditor)?;
            editor.code = editor.starter.clone();
            (editor.key.clone(), editor.starter.clone())
        };
        self.writer.discard(&key)?;
        tracing::debug!(%key, "Editor reset to starter code");
        Ok(starter)
    }

    pub async fn run(&self) -> Result<RoundOutcome, WorkbenchError> {
        self.grade(GradingMode::Run).await
    }

    pub async fn submit(&self) -> Result<RoundOutcome, WorkbenchError> {
        self.grade(GradingMode::Submit).await
    }

    async fn grade(&self, mode: GradingMode) -> Result<RoundOutcome, WorkbenchError> {
        let (key, code) = {
            let editor = self.editor();
            let editor = editor.as_ref().ok_or(WorkbenchError::NoActiveEditor)?;
            (editor.key.clone(), editor.code.clone())
        };
        self.orchestrator
            .round(&key.problem_id, key.language, &code, mode)
            .await
    }

    /// Flushes every pending write and stops the sweeper. Returns how many
    /// writes were flushed.
    pub fn shutdown(&mut self) -> usize {
        if self.closed {
            return 0;
        }
        self.closed = true;
        let flushed = self.writer.flush_all();
        self.sweeper.stop();
        tracing::info!(flushed, "Workbench session closed");
        flushed
    }
}

impl Drop for WorkbenchSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
