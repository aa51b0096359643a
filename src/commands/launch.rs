//! Command: swap a profile in, run the game, restore.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, LaunchOpts};
use crate::config::Profile;
use crate::error::LaunchError;
use crate::launch::{LaunchTarget, Launcher};
use crate::logging::{EntryStatus, Logger};
use crate::swap::{PlannedAction, SwapEngine};

/// Run the launch command.
///
/// # Errors
///
/// Returns an error if the configuration lookup fails, the game cannot be
/// started, or any swapped file was not restored cleanly.
pub fn run(global: &GlobalOpts, opts: &LaunchOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let game = setup.config.game(&opts.game)?;
    let profile = setup.config.profile(&opts.game, opts.profile.as_deref())?;
    let target = LaunchTarget::from(game);
    let engine = setup.engine();

    log.info(&format!(
        "game: {}  profile: {}",
        target.name,
        profile.display_name()
    ));

    if global.dry_run {
        log.stage("Planning swap");
        record_plan(&engine, &profile, log, true);
        log.print_summary();
        return Ok(());
    }

    warn_orphans(&engine, log);
    record_plan(&engine, &profile, log, false);
    install_interrupt_handler(log);

    let launcher = Launcher::new(engine).with_placement(setup.platform.window_placement());
    log.stage(&format!("Launching {}", target.name));
    let outcome = launcher.run_to_completion(&target, &profile);
    if let Err(LaunchError::Spawn { cleanup, .. }) = &outcome {
        log.stage("Restored configuration");
        super::record_report(cleanup, log);
        log.print_summary();
    }
    let (status, report) = outcome?;

    match status.code() {
        Some(0) => log.info(&format!("{} exited normally", target.name)),
        Some(code) => log.warn(&format!("{} exited with code {code}", target.name)),
        None => log.warn(&format!("{} was terminated by a signal", target.name)),
    }

    log.stage("Restored configuration");
    super::record_report(&report, log);
    super::finish(log)
}

/// Log what apply will do and record skipped rules for the summary.
///
/// In dry-run mode every applicable rule is recorded as well; otherwise
/// those are recorded from the restore report after the game exits.
fn record_plan(engine: &SwapEngine, profile: &Profile, log: &Logger, dry_run: bool) {
    for planned in engine.plan(&profile.rules) {
        let name = profile
            .rules
            .get(planned.rule_index)
            .map_or_else(|| planned.destination.display().to_string(), |r| {
                r.destination.display().to_string()
            });
        match planned.action {
            PlannedAction::Skip(reason) => {
                log.debug(&format!("rule {}: skip {name} ({reason})", planned.rule_index));
                log.record_entry(&name, reason.into(), Some(&reason.to_string()));
            }
            action if dry_run => {
                log.dry_run(&format!("would {action} {name}"));
                log.record_entry(&name, EntryStatus::DryRun, Some(&action.to_string()));
            }
            action => log.debug(&format!("rule {}: {action} {name}", planned.rule_index)),
        }
    }
}

fn warn_orphans(engine: &SwapEngine, log: &Logger) {
    let orphans = engine.orphans();
    if orphans.is_empty() {
        return;
    }
    log.warn(&format!(
        "{} unrestored session(s) under {}; run `swaplaunch recover` once no game is running",
        orphans.len(),
        engine.backups_root().display()
    ));
    for id in &orphans {
        log.debug(&format!("  orphaned session {id}"));
    }
}

/// Keep the launcher alive on Ctrl-C so the restore still runs.
///
/// The interrupt reaches the game through the shared process group; the
/// launcher then restores once the game has exited.
fn install_interrupt_handler(log: &Logger) {
    let result = ctrlc::set_handler(|| {
        tracing::warn!("interrupt received; waiting for the game to exit before restoring");
    });
    if let Err(e) = result {
        log.debug(&format!("interrupt handler not installed: {e}"));
    }
}
