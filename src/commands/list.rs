//! Command: show configured games and profiles.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::config::Game;
use crate::logging::Logger;

/// Run the list command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;

    log.stage("Games");
    if setup.config.games.is_empty() {
        log.info(&format!(
            "no games configured in {}",
            setup.config.path.display()
        ));
        return Ok(());
    }

    for (key, game) in &setup.config.games {
        for line in describe(key, game) {
            log.info(&line);
        }
    }
    Ok(())
}

/// Lines describing one game and its profiles.
fn describe(key: &str, game: &Game) -> Vec<String> {
    let mut lines = vec![format!("{key} ({}): {}", game.name, game.exe_path.display())];
    if game.profiles.is_empty() {
        lines.push("    (no profiles)".to_string());
    }
    for (i, profile) in game.profiles.iter().enumerate() {
        let enabled = profile.rules.iter().filter(|r| r.enabled).count();
        let default = if i == 0 { " [default]" } else { "" };
        lines.push(format!(
            "    {} ({}): {enabled}/{} rule(s){default}",
            profile.key,
            profile.display_name(),
            profile.rules.len()
        ));
    }
    lines
}
