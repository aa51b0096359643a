//! Command: restore sessions left behind by a launcher that never restored.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::logging::{EntryStatus, Logger};
use crate::swap::RecoveryOutcome;

/// Run the recover command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or any recovered
/// file was not restored cleanly.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let engine = setup.engine();

    log.stage("Recovering sessions");
    let orphans = engine.orphans();
    if orphans.is_empty() {
        log.info(&format!(
            "no sessions under {}",
            engine.backups_root().display()
        ));
        return Ok(());
    }

    if global.dry_run {
        for id in &orphans {
            log.dry_run(&format!("would recover session {id}"));
            log.record_entry(id.as_str(), EntryStatus::DryRun, None);
        }
        log.print_summary();
        return Ok(());
    }

    for recovered in engine.recover() {
        let id = recovered.id.as_str();
        match recovered.outcome {
            RecoveryOutcome::Restored(report) => {
                log.info(&format!(
                    "session {id}: {} file(s) processed",
                    report.entries.len()
                ));
                super::record_report(&report, log);
            }
            RecoveryOutcome::RemovedEmpty => {
                log.debug(&format!("session {id}: empty directory removed"));
            }
            RecoveryOutcome::NoJournal => {
                log.record_entry(
                    id,
                    EntryStatus::Skipped,
                    Some("no journal; inspect the directory by hand"),
                );
            }
            RecoveryOutcome::Unreadable { reason } => {
                log.error(&format!("session {id}: {reason}"));
                log.record_entry(id, EntryStatus::Failed, Some(&reason));
            }
        }
    }

    super::finish(log)
}
