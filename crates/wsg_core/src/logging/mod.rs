//! Logging for the settings tool.
//!
//! This module provides:
//! - `tracing` subscriber setup for diagnostics (stderr, optionally a file),
//!   directly or from [`Settings`](crate::config::Settings)
//! - The action log: one line per audit, merge or rejected edit
//!
//! The rest of the crate only emits `tracing` events; installing a
//! subscriber and keeping an action log are left to the application.
//!
//! # Example
//!
//! ```no_run
//! use wsg_core::logging::{init_tracing, ActionLog, ActionResult, LogLevel};
//!
//! init_tracing(LogLevel::Info);
//!
//! let log = ActionLog::new("User Data", "logs.txt", None).unwrap();
//! log.record("backup", ActionResult::Ok, "preferences.xml copied");
//! ```

mod action_log;
mod types;

pub use action_log::{format_line, ActionLog};
pub use types::{ActionResult, LogCallback, LogLevel};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Settings;

/// Install a global stderr subscriber.
///
/// `RUST_LOG` overrides `default_level`. Does nothing if a global
/// subscriber is already installed.
pub fn init_tracing(default_level: LogLevel) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter(default_level))
        .try_init();
}

/// Install a global subscriber writing to stderr and to `log_dir/file_name`.
///
/// Keep the returned guard alive: dropping it flushes and stops the file
/// writer.
pub fn init_tracing_with_file(
    default_level: LogLevel,
    show_timestamps: bool,
    log_dir: impl AsRef<Path>,
    file_name: &str,
) -> Result<WorkerGuard, InitError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let stderr_timed = show_timestamps.then(|| fmt::layer().with_target(true));
    let stderr_plain = (!show_timestamps).then(|| fmt::layer().with_target(true).without_time());

    let _ = tracing_subscriber::registry()
        .with(stderr_timed)
        .with(stderr_plain)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .try_init();

    Ok(guard)
}

/// Diagnostics file written next to the action log.
pub const DIAGNOSTICS_FILE: &str = "diagnostics.log";

/// Install the global subscriber described by the tool settings.
///
/// Level and timestamps come from `logging`; the diagnostics file goes to
/// `paths.logs_folder`.
pub fn init_tracing_from_settings(settings: &Settings) -> Result<WorkerGuard, InitError> {
    init_tracing_with_file(
        settings.logging.level,
        settings.logging.show_timestamps,
        &settings.paths.logs_folder,
        DIAGNOSTICS_FILE,
    )
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_filter()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(LogLevel::Debug.as_filter(), "debug");
        assert_eq!(LogLevel::Info.as_filter(), "info");
        assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Trace < LogLevel::Info);
        assert!(LogLevel::Error > LogLevel::Warn);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn file_subscriber_creates_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let guard = init_tracing_with_file(LogLevel::Info, false, dir.path(), "trace.log").unwrap();
        tracing::info!("file subscriber installed");
        drop(guard);

        assert!(dir.path().join("trace.log").is_file());
    }

    #[test]
    fn file_subscriber_reports_unusable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        assert!(init_tracing_with_file(LogLevel::Info, true, blocker.join("logs"), "trace.log").is_err());
    }

    #[test]
    fn settings_pick_the_diagnostics_location() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.logs_folder = dir.path().display().to_string();
        settings.logging.show_timestamps = false;

        let guard = init_tracing_from_settings(&settings).unwrap();
        drop(guard);
        assert!(dir.path().join(DIAGNOSTICS_FILE).is_file());
    }

    #[test]
    fn init_is_idempotent() {
        init_test_tracing();
        init_tracing(LogLevel::Debug);
        tracing::warn!("still logging after a second init");
    }
}
