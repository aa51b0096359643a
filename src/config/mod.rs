//! Launcher configuration (`launcher.toml`).
pub mod games;
pub mod toml_loader;
pub mod validation;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::exec;
use crate::platform::Platform;

pub use games::{Game, Profile};

/// File name of the launcher configuration inside the config directory.
pub const CONFIG_FILE: &str = "launcher.toml";

/// All games known to the launcher.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Where session backups are stored; the cache directory when unset.
    #[serde(default)]
    pub backups_root: Option<PathBuf>,
    /// Games keyed by the name used on the command line.
    #[serde(default)]
    pub games: BTreeMap<String, Game>,
    /// Path the configuration was loaded from.
    #[serde(skip)]
    pub path: PathBuf,
}

impl Config {
    /// Load the configuration at `path`.
    ///
    /// A missing file yields an empty configuration. Relative rule paths, a
    /// relative `backups_root` and a relative `exe_path` with a directory
    /// part are resolved against the file's directory; bare executable
    /// names stay as they are for a `PATH` lookup. Rules with an empty path
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml_loader::load_config(path)?;
        config.path = path.to_path_buf();

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        if let Some(root) = config.backups_root.as_mut()
            && root.is_relative()
        {
            *root = base.join(&*root);
        }
        for (key, game) in &mut config.games {
            if game.name.is_empty() {
                game.name.clone_from(key);
            }
            if game.exe_path.is_relative() && exec::working_dir_for(&game.exe_path).is_some() {
                game.exe_path = base.join(&game.exe_path);
            }
            for profile in &mut game.profiles {
                profile.normalize_rules(base);
            }
        }
        Ok(config)
    }

    /// Default configuration file location for `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoBaseDir`] when no config directory can be
    /// determined.
    pub fn default_path(platform: &Platform) -> Result<PathBuf, ConfigError> {
        platform
            .config_dir()
            .map(|dir| dir.join(CONFIG_FILE))
            .ok_or(ConfigError::NoBaseDir("config"))
    }

    /// Backups root to use: the configured one, else `<cache>/backups`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoBaseDir`] when neither is available.
    pub fn resolve_backups_root(&self, platform: &Platform) -> Result<PathBuf, ConfigError> {
        if let Some(root) = &self.backups_root {
            return Ok(root.clone());
        }
        platform
            .cache_dir()
            .map(|dir| dir.join("backups"))
            .ok_or(ConfigError::NoBaseDir("cache"))
    }

    /// Check the configuration for likely mistakes.
    #[must_use]
    pub fn validate(&self) -> Vec<validation::ValidationWarning> {
        validation::validate_all(self)
    }

    /// Look up a game by key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownGame`] if no such game is configured.
    pub fn game(&self, key: &str) -> Result<&Game, ConfigError> {
        self.games
            .get(key)
            .ok_or_else(|| ConfigError::UnknownGame(key.to_string()))
    }

    /// Resolve the profile to launch `game_key` with.
    ///
    /// Without `profile_key` the game's first profile is used, and a game
    /// with no profiles gets an empty one (no rules, no placement).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownGame`] or [`ConfigError::UnknownProfile`]
    /// when the lookup fails.
    pub fn profile(&self, game_key: &str, profile_key: Option<&str>) -> Result<Profile, ConfigError> {
        let game = self.game(game_key)?;
        match (game.find_profile(profile_key), profile_key) {
            (Some(profile), _) => Ok(profile.clone()),
            (None, None) => {
                let mut profile = Profile::empty("default");
                profile.move_window = false;
                Ok(profile)
            }
            (None, Some(key)) => Err(ConfigError::UnknownProfile {
                game: game_key.to_string(),
                profile: key.to_string(),
            }),
        }
    }
}
