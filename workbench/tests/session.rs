mod common;

use code_cache::{CacheKey, SaveStatus};
use common::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use util::languages::Language;
use workbench::{RoundOutcome, SessionSettings, WorkbenchError, WorkbenchSession};

const STARTER: &str = "# write your solution\n";

fn settings() -> SessionSettings {
    SessionSettings {
        quiet_period: QUIET,
        sweep_interval: Duration::from_secs(3600),
        grader_timeout: GRADER_TIMEOUT,
    }
}

fn session(fixture: &Fixture, grader: Arc<MockGrader>) -> WorkbenchSession {
    WorkbenchSession::new(
        fixture.store.clone(),
        fixture.problems.clone(),
        grader,
        settings(),
    )
}

fn idle_grader() -> Arc<MockGrader> {
    MockGrader::new(Behaviour::Respond(json!([])))
}

async fn past_quiet_period() {
    tokio::time::sleep(QUIET + Duration::from_millis(100)).await;
}

#[tokio::test(start_paused = true)]
async fn fresh_editor_shows_starter_code() {
    let fixture = Fixture::new([sum_problem()]);
    let session = session(&fixture, idle_grader());

    let opened = session.open_editor("sum", Language::Python, STARTER);
    assert_eq!(opened.code, STARTER);
    assert!(!opened.restored);
    assert_eq!(opened.remaining, None);
    assert_eq!(session.cache_status(), None);
}

#[tokio::test(start_paused = true)]
async fn edits_are_saved_after_the_quiet_period() {
    let fixture = Fixture::new([sum_problem()]);
    let session = session(&fixture, idle_grader());
    let mut events = session.subscribe();

    session.open_editor("sum", Language::Python, STARTER);
    assert_eq!(session.edit("a = 1").unwrap(), Some(SaveStatus::Saving));
    assert_eq!(session.cache_status().unwrap().status, SaveStatus::Saving);

    past_quiet_period().await;

    let status = session.cache_status().unwrap();
    assert_eq!(status.status, SaveStatus::Saved);
    assert_eq!(status.remaining.as_deref(), Some("6h 0m"));

    assert_eq!(events.recv().await.unwrap().status, SaveStatus::Saving);
    let saved = events.recv().await.unwrap();
    assert_eq!(saved.status, SaveStatus::Saved);
    assert_eq!(saved.key, CacheKey::new("sum", Language::Python));
}

#[tokio::test(start_paused = true)]
async fn reopening_restores_the_draft_with_its_remaining_time() {
    let fixture = Fixture::new([sum_problem()]);
    {
        let first = session(&fixture, idle_grader());
        first.open_editor("sum", Language::Python, STARTER);
        first.edit("draft").unwrap();
        past_quiet_period().await;
    }

    fixture.clock.advance(chrono::TimeDelta::minutes(45));
    let second = session(&fixture, idle_grader());
    let opened = second.open_editor("sum", Language::Python, STARTER);

    assert!(opened.restored);
    assert_eq!(opened.code, "draft");
    assert_eq!(opened.remaining.unwrap().to_string(), "5h 15m");
    assert_eq!(second.code().as_deref(), Some("draft"));
}

#[tokio::test(start_paused = true)]
async fn reverting_to_starter_leaves_nothing_cached() {
    let fixture = Fixture::new([sum_problem()]);
    let session = session(&fixture, idle_grader());
    session.open_editor("sum", Language::Python, STARTER);

    session.edit("changed").unwrap();
    past_quiet_period().await;
    assert!(!fixture.storage.is_empty());

    assert_eq!(session.edit(STARTER).unwrap(), None);
    past_quiet_period().await;
    assert!(fixture.storage.is_empty());
}

#[tokio::test(start_paused = true)]
async fn reset_discards_the_draft() {
    let fixture = Fixture::new([sum_problem()]);
    let session = session(&fixture, idle_grader());
    session.open_editor("sum", Language::Python, STARTER);

    session.edit("half done").unwrap();
    assert_eq!(session.reset().unwrap(), STARTER);
    past_quiet_period().await;

    assert!(fixture.storage.is_empty());
    assert_eq!(session.code().as_deref(), Some(STARTER));
    assert_eq!(session.cache_status(), None);
}

#[tokio::test(start_paused = true)]
async fn switching_editors_flushes_the_previous_draft() {
    let fixture = Fixture::new([sum_problem()]);
    let session = session(&fixture, idle_grader());

    session.open_editor("sum", Language::Python, STARTER);
    session.edit("python draft").unwrap();
    session.open_editor("sum", Language::Java, "");

    let cached = fixture
        .store
        .read(&CacheKey::new("sum", Language::Python))
        .unwrap()
        .unwrap();
    assert_eq!(cached.code, "python draft");
}

#[tokio::test(start_paused = true)]
async fn run_grades_the_current_code() {
    let fixture = Fixture::new([sum_problem()]);
    let grader = MockGrader::new(Behaviour::Respond(json!([
        { "index": 0, "status": "Accepted" },
        { "index": 1, "status": "Accepted" },
        { "index": 2, "status": "Accepted" },
    ])));
    let session = session(&fixture, grader.clone());

    session.open_problem("sum", Language::Python).await.unwrap();
    session.edit("print(sum(map(int, input().split())))").unwrap();
    let outcome = session.run().await.unwrap();

    assert!(matches!(outcome, RoundOutcome::Completed { ref report } if report.success));
    assert_eq!(
        grader.last_request().unwrap().code,
        "print(sum(map(int, input().split())))"
    );
    // The round flushed the pending write.
    assert_eq!(session.cache_status().unwrap().status, SaveStatus::Saved);
}

#[tokio::test(start_paused = true)]
async fn actions_without_an_open_editor_are_rejected() {
    let fixture = Fixture::new([sum_problem()]);
    let session = session(&fixture, idle_grader());

    assert!(matches!(session.edit("x"), Err(WorkbenchError::NoActiveEditor)));
    assert!(matches!(session.reset(), Err(WorkbenchError::NoActiveEditor)));
    assert!(matches!(session.submit().await, Err(WorkbenchError::NoActiveEditor)));
}

#[tokio::test(start_paused = true)]
async fn shutdown_flushes_pending_writes() {
    let fixture = Fixture::new([sum_problem()]);
    let mut session = session(&fixture, idle_grader());
    session.open_editor("sum", Language::Python, STARTER);
    session.edit("unsaved").unwrap();

    assert_eq!(session.shutdown(), 1);
    assert_eq!(session.shutdown(), 0);

    let cached = fixture
        .store
        .read(&CacheKey::new("sum", Language::Python))
        .unwrap()
        .unwrap();
    assert_eq!(cached.code, "unsaved");
}

#[tokio::test(start_paused = true)]
async fn configured_session_keeps_drafts_in_the_cache_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut config = util::config::AppConfig::from_env();
    config.cache_file = tmp.path().join("cache.json").to_string_lossy().into_owned();
    config.cache_debounce_ms = 2_000;

    let fixture = Fixture::new([sum_problem()]);
    {
        let mut first = WorkbenchSession::from_config(fixture.problems.clone(), idle_grader(), &config);
        first.open_editor("sum", Language::Python, STARTER);
        first.edit("on disk").unwrap();
        first.shutdown();
    }

    let second = WorkbenchSession::from_config(fixture.problems.clone(), idle_grader(), &config);
    let opened = second.open_editor("sum", Language::Python, STARTER);
    assert!(opened.restored);
    assert_eq!(opened.code, "on disk");
}
