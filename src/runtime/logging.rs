use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingSettings, default_log_dir};

const LOG_FILE: &str = "ttunes.log";

/// Install a daily-rotating file subscriber. The terminal belongs to the TUI,
/// so nothing is written to stdout or stderr.
///
/// The returned guard flushes buffered lines on drop; keep it alive for the
/// whole run.
fn init(settings: &LoggingSettings, cli_level: Option<&str>) -> anyhow::Result<WorkerGuard> {
    let dir = log_dir(settings);
    fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let directive = filter_directive(settings, cli_level, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter {directive:?}"))?;

    tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install log subscriber: {e}"))?;

    Ok(guard)
}

/// Like [`init`], but a logging failure is not fatal: the player runs
/// without a log file and the returned notice explains why.
pub fn init_or_notice(
    settings: &LoggingSettings,
    cli_level: Option<&str>,
) -> (Option<WorkerGuard>, Option<String>) {
    match init(settings, cli_level) {
        Ok(guard) => (Some(guard), None),
        Err(e) => (None, Some(format!("logging disabled: {e:#}"))),
    }
}

fn log_dir(settings: &LoggingSettings) -> PathBuf {
    settings
        .directory
        .clone()
        .or_else(default_log_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `--log-level` beats `RUST_LOG`, which beats `logging.level`.
fn filter_directive(
    settings: &LoggingSettings,
    cli_level: Option<&str>,
    rust_log: Option<String>,
) -> String {
    cli_level
        .map(str::to_string)
        .or(rust_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| settings.level.clone())
}
