//! Tracing subscriber setup for hosts embedding the workbench.

use std::path::Path;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a global subscriber writing to a daily-rolling file next to
/// `log_file`, and to stdout when `log_to_stdout` is set.
///
/// `LOG_LEVEL` in the environment takes precedence over `log_level`. The
/// returned guard must be kept alive for buffered lines to be flushed. If a
/// global subscriber is already installed the call leaves it in place.
pub fn init_logging(log_file: &str, log_level: &str, log_to_stdout: bool) -> WorkerGuard {
    let path = Path::new(log_file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("logs"));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbench.log".into());

    std::fs::create_dir_all(dir).ok();

    let file_appender = rolling::daily(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = log_to_stdout.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true)
    });

    let env_filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(log_level));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already installed; keeping it");
    }

    guard
}
