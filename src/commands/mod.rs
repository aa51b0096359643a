pub mod launch;
pub mod list;
pub mod recover;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::logging::{EntryStatus, Logger};
use crate::platform::Platform;
use crate::swap::{RestoreReport, SwapEngine};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, configuration loading and backups-root
/// resolution so that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    pub platform: Platform,
    pub config: Config,
    pub backups_root: PathBuf,
}

impl CommandSetup {
    /// Detect the platform, load the configuration and pick the backups root.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be located or parsed, or
    /// no backups root can be determined.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let platform = Platform::detect();
        let path = match &global.config {
            Some(path) => path.clone(),
            None => Config::default_path(&platform)?,
        };

        log.stage("Loading configuration");
        let config = Config::load(&path)
            .with_context(|| format!("loading {}", path.display()))?;
        log.info(&format!(
            "loaded {} game(s) from {}",
            config.games.len(),
            path.display()
        ));
        for (key, game) in &config.games {
            log.debug(&format!("{key}: {} profile(s)", game.profiles.len()));
        }

        let backups_root = match &global.backups_root {
            Some(root) => root.clone(),
            None => config.resolve_backups_root(&platform)?,
        };
        log.debug(&format!("backups root: {}", backups_root.display()));

        // Validate configuration and display warnings
        let warnings = config.validate();
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self {
            platform,
            config,
            backups_root,
        })
    }

    /// Swap engine rooted at the resolved backups root.
    #[must_use]
    pub fn engine(&self) -> SwapEngine {
        SwapEngine::new(&self.backups_root)
    }
}

/// Record every entry of a restore report for the summary.
pub(crate) fn record_report(report: &RestoreReport, log: &Logger) {
    for entry in &report.entries {
        let status = EntryStatus::from(&entry.status);
        let message = entry.status.to_string();
        log.record_entry(
            &entry.destination.display().to_string(),
            status,
            Some(&message),
        );
    }
    if !report.backup_dir_removed {
        log.warn(&format!(
            "session {}: backup directory was left behind",
            report.session
        ));
    }
}

/// Print the summary and fail if any entry failed or lost its original.
///
/// # Errors
///
/// Returns an error if one or more entries recorded a failure.
pub(crate) fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    if log.has_failures() {
        anyhow::bail!("{} file(s) were not restored cleanly", log.failure_count());
    }
    Ok(())
}
