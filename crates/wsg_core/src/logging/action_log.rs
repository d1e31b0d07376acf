//! Append-only record of what the tool did to the user's files.
//!
//! Each line has the form
//! `YYYY-MM-DD_HH:MM:SS | <action> | Result: [OK] | Details: <text>`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use super::types::{ActionResult, LogCallback};
use crate::audit::AuditReport;
use crate::config::Settings;
use crate::merge::MergeReport;
use crate::validate::ValidationFailure;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Action log backed by a file in append mode, with an optional callback.
pub struct ActionLog {
    log_path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
    callback: Mutex<Option<LogCallback>>,
}

impl ActionLog {
    /// Open (or create) `file_name` inside `log_dir` for appending.
    pub fn new(
        log_dir: impl AsRef<Path>,
        file_name: &str,
        callback: Option<LogCallback>,
    ) -> io::Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(file_name);
        let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

        Ok(Self {
            log_path,
            writer: Mutex::new(Some(BufWriter::new(file))),
            callback: Mutex::new(callback),
        })
    }

    /// Open the log named by the tool settings.
    ///
    /// Returns `None` when `logging.record_actions` is off.
    pub fn from_settings(settings: &Settings) -> io::Result<Option<Self>> {
        if !settings.logging.record_actions {
            return Ok(None);
        }
        Self::new(&settings.paths.logs_folder, &settings.logging.log_file, None).map(Some)
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Record one action.
    pub fn record(&self, action: &str, result: ActionResult, details: &str) {
        let line = format_line(&Local::now(), action, result, details);
        self.output(&line);
    }

    pub fn record_audit(&self, report: &AuditReport) {
        let details = if !report.well_formed {
            format!(
                "malformed XML: {}",
                report.parse_error.as_deref().unwrap_or("unknown error")
            )
        } else {
            format!(
                "{} structure warning(s), {} value warning(s)",
                report.structure_warnings.len(),
                report.value_warnings.len()
            )
        };
        self.record("audit", ActionResult::from_success(report.is_clean()), &details);
    }

    pub fn record_merge(&self, report: &MergeReport) {
        let missing: Vec<&str> = report.not_found().map(|key| key.as_str()).collect();
        let mut details = format!(
            "{} applied, {} unchanged, {} not found",
            report.applied(),
            report.unchanged(),
            missing.len()
        );
        if !missing.is_empty() {
            details.push_str(&format!(" ({})", missing.join(", ")));
        }
        if let Some(reason) = report.persist_error() {
            details.push_str(&format!("; not saved: {}", reason));
        }
        self.record(
            "merge",
            ActionResult::from_success(report.persist_error().is_none()),
            &details,
        );
    }

    pub fn record_rejection(&self, failures: &[ValidationFailure]) {
        let details = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        self.record("validate", ActionResult::Nok, &details);
    }

    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Flush and release the file.
    pub fn close(&self) {
        self.flush();
        *self.writer.lock() = None;
    }

    fn output(&self, line: &str) {
        if let Some(ref mut writer) = *self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
        if let Some(ref callback) = *self.callback.lock() {
            callback(line);
        }
    }
}

impl Drop for ActionLog {
    fn drop(&mut self) {
        self.close();
    }
}

/// Format one action log line.
pub fn format_line(
    timestamp: &DateTime<Local>,
    action: &str,
    result: ActionResult,
    details: &str,
) -> String {
    format!(
        "{} | {} | Result: {} | Details: {}",
        timestamp.format(TIMESTAMP_FORMAT),
        action,
        result,
        details
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Auditor;
    use crate::validate::InvalidReason;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn line_format() {
        let ts = Local.with_ymd_and_hms(2024, 5, 1, 9, 3, 7).unwrap();
        assert_eq!(
            format_line(&ts, "merge", ActionResult::Ok, "1 applied"),
            "2024-05-01_09:03:07 | merge | Result: [OK] | Details: 1 applied"
        );
    }

    #[test]
    fn appends_across_instances() {
        let dir = tempdir().unwrap();
        {
            let log = ActionLog::new(dir.path(), "logs.txt", None).unwrap();
            log.record("backup", ActionResult::Ok, "first");
        }
        {
            let log = ActionLog::new(dir.path(), "logs.txt", None).unwrap();
            log.record("restore", ActionResult::Nok, "second");
        }

        let content = fs::read_to_string(dir.path().join("logs.txt")).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("| backup | Result: [OK] | Details: first"));
        assert!(lines[1].ends_with("| restore | Result: [NOK] | Details: second"));
    }

    #[test]
    fn records_audit_and_calls_back() {
        let dir = tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let callback: LogCallback = Box::new(move |line| {
            assert!(line.contains("| audit | Result: [NOK]"));
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let log = ActionLog::new(dir.path(), "logs.txt", Some(callback)).unwrap();
        log.record_audit(&Auditor::default().audit_text("<root/>"));
        log.flush();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let content = fs::read_to_string(log.log_path()).unwrap();
        assert!(content.contains("3 structure warning(s), 0 value warning(s)"));
    }

    #[test]
    fn settings_can_turn_the_log_off() {
        let dir = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.logs_folder = dir.path().join("User Data").display().to_string();

        let log = ActionLog::from_settings(&settings).unwrap().unwrap();
        assert_eq!(log.log_path(), dir.path().join("User Data").join("logs.txt"));
        drop(log);

        settings.logging.record_actions = false;
        settings.logging.log_file = "disabled.txt".to_string();
        assert!(ActionLog::from_settings(&settings).unwrap().is_none());
        assert!(!dir.path().join("User Data").join("disabled.txt").exists());
    }

    #[test]
    fn records_rejected_batch() {
        let dir = tempdir().unwrap();
        let log = ActionLog::new(dir.path(), "logs.txt", None).unwrap();
        let failures = vec![
            ValidationFailure {
                key: "masterVolume".into(),
                value: "2.0".to_string(),
                reason: InvalidReason::OutOfRange,
            },
            ValidationFailure {
                key: "arcadeMode/horzInvert".into(),
                value: "yes".to_string(),
                reason: InvalidReason::WrongBooleanToken,
            },
        ];
        log.record_rejection(&failures);
        log.close();

        let content = fs::read_to_string(dir.path().join("logs.txt")).unwrap();
        assert!(content.trim_end().ends_with(
            "| validate | Result: [NOK] | Details: \
             Invalid value for 'masterVolume': '2.0' (out of range); \
             Invalid value for 'arcadeMode/horzInvert': 'yes' (wrong boolean token)"
        ));
    }

    #[test]
    fn records_merge_summary() {
        let dir = tempdir().unwrap();
        let log = ActionLog::new(dir.path(), "logs.txt", None).unwrap();
        log.record_merge(&MergeReport::default());
        log.close();

        let content = fs::read_to_string(dir.path().join("logs.txt")).unwrap();
        assert!(content.contains("| merge | Result: [OK] | Details: 0 applied, 0 unchanged, 0 not found"));
    }
}
