use std::collections::HashSet;
use std::path::Path;

use super::{Config, Game, Profile};
use crate::exec;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration section (e.g., "games.portal", "games.portal.tv").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration validators.
///
/// Validators only report; nothing they find prevents a launch.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self) -> Vec<ValidationWarning>;
}

/// Checks a game's executable and the uniqueness of its profile keys.
#[derive(Debug)]
pub struct GameValidator<'a> {
    key: &'a str,
    game: &'a Game,
}

impl<'a> GameValidator<'a> {
    #[must_use]
    pub const fn new(key: &'a str, game: &'a Game) -> Self {
        Self { key, game }
    }
}

impl ConfigValidator for GameValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let section = format!("games.{}", self.key);
        let exe = self.game.exe_path.to_string_lossy();

        if exe.trim().is_empty() {
            warnings.push(ValidationWarning::new(
                &section,
                "exe_path",
                "executable path is empty",
            ));
        } else if exec::resolve_program(Path::new(exe.trim())).is_none() {
            warnings.push(ValidationWarning::new(
                &section,
                "exe_path",
                format!("executable not found: {exe}"),
            ));
        }

        let mut seen = HashSet::new();
        for profile in &self.game.profiles {
            if !seen.insert(profile.key.as_str()) {
                warnings.push(ValidationWarning::new(
                    &section,
                    &profile.key,
                    "duplicate profile key; only the first is reachable",
                ));
            }
        }

        warnings
    }
}

/// Checks the swap rules of one profile.
#[derive(Debug)]
pub struct RuleValidator<'a> {
    section: String,
    profile: &'a Profile,
}

impl<'a> RuleValidator<'a> {
    #[must_use]
    pub fn new(game_key: &str, profile: &'a Profile) -> Self {
        Self {
            section: format!("games.{game_key}.{}", profile.key),
            profile,
        }
    }
}

impl ConfigValidator for RuleValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut destinations = HashSet::new();

        for rule in self.profile.rules.iter().filter(|r| r.enabled) {
            if !rule.source.exists() {
                warnings.push(ValidationWarning::new(
                    &self.section,
                    rule.source.display().to_string(),
                    "source file does not exist; rule will be skipped",
                ));
            }

            if !destinations.insert(rule.destination.as_path()) {
                warnings.push(ValidationWarning::new(
                    &self.section,
                    rule.destination.display().to_string(),
                    "destination is swapped by more than one rule",
                ));
            }
        }

        warnings
    }
}

/// Validate all configuration and return collected warnings.
#[must_use]
pub fn validate_all(config: &Config) -> Vec<ValidationWarning> {
    let mut validators: Vec<Box<dyn ConfigValidator + '_>> = Vec::new();
    for (key, game) in &config.games {
        validators.push(Box::new(GameValidator::new(key, game)));
        for profile in &game.profiles {
            validators.push(Box::new(RuleValidator::new(key, profile)));
        }
    }

    validators.iter().flat_map(|v| v.validate()).collect()
}
