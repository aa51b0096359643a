//! Command-facing logging facade and end-of-run summary.
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{EntryStatus, SummaryEntry};
use super::utils::log_file_path;

/// Logging facade used by the commands.
///
/// Wraps the `tracing` macros with stage and dry-run targets and collects a
/// [`SummaryEntry`] per file so the command can end with a summary. Every
/// line, debug included, also lands in `<cache dir>/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    entries: Mutex<Vec<SummaryEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Logger for `command`.
    ///
    /// Only remembers where the log file lives, for the summary footer;
    /// [`init_subscriber`](super::init_subscriber) creates the file.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Where this run's log file lives.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn summary_entries(&self) -> Vec<SummaryEntry> {
        self.snapshot()
    }

    /// Error line, to stderr.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Warning line, to stderr.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Section header, rendered as `==> msg`.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Plain progress line.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Console only with `--verbose`; always in the log file.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// A change that `--dry-run` held back.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Add one file to the summary.
    pub fn record_entry(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SummaryEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
    }

    /// `true` if any recorded file failed or lost its original.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Number of recorded files that failed or lost their original.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.snapshot()
            .iter()
            .filter(|e| e.status.is_failure())
            .count()
    }

    /// Print every recorded file followed by per-status totals.
    ///
    /// Prints nothing when no file was recorded.
    pub fn print_summary(&self) {
        let entries = self.snapshot();
        if entries.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");
        for entry in &entries {
            let (icon, colour) = entry.status.badge();
            let detail = entry
                .message
                .as_deref()
                .map_or_else(String::new, |m| format!(" ({m})"));
            self.info(&format!("{colour}{icon} {}{detail}\x1b[0m", entry.name));
        }

        println!();
        let totals: Vec<String> = EntryStatus::ALL
            .into_iter()
            .map(|status| {
                let count = entries.iter().filter(|e| e.status == status).count();
                let (_, colour) = status.badge();
                format!("{colour}{count} {}\x1b[0m", status.label())
            })
            .collect();
        self.info(&format!("{} files: {}", entries.len(), totals.join(", ")));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }

    fn snapshot(&self) -> Vec<SummaryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
