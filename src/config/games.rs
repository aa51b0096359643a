//! Games and display profiles as declared in `launcher.toml`.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::platform::{PlacementRequest, WindowMode};
use crate::swap::Rule;

const fn default_true() -> bool {
    true
}

/// A launchable title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Game {
    /// Display name; the table key is used when empty.
    #[serde(default)]
    pub name: String,
    /// Executable to start.
    #[serde(default)]
    pub exe_path: PathBuf,
    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,
    /// Display profiles, the first being the default.
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Game {
    /// The profile with `key`, or the first profile when `key` is `None`.
    #[must_use]
    pub fn find_profile(&self, key: Option<&str>) -> Option<&Profile> {
        match key {
            Some(key) => self.profiles.iter().find(|p| p.key == key),
            None => self.profiles.first(),
        }
    }
}

/// How to present a game: which rules to swap and where its window goes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    /// Identifier used on the command line.
    pub key: String,
    /// Display name; the key is used when empty.
    #[serde(default)]
    pub name: String,
    /// Target monitor, as an index string ("0", "1", ...).
    #[serde(default)]
    pub monitor_id: String,
    /// Move the game window onto the target monitor after launch.
    #[serde(default = "default_true")]
    pub move_window: bool,
    /// Bring the window to the foreground after moving it.
    #[serde(default = "default_true")]
    pub force_focus: bool,
    /// Presentation on the target monitor.
    #[serde(default)]
    pub window_mode: WindowMode,
    /// Files swapped while the game runs.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Profile {
    /// Profile with no rules and default window handling.
    #[must_use]
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: String::new(),
            monitor_id: String::new(),
            move_window: true,
            force_focus: true,
            window_mode: WindowMode::default(),
            rules: Vec::new(),
        }
    }

    /// Name shown to the user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.key
        } else {
            &self.name
        }
    }

    /// Window placement asked for by this profile, if any.
    ///
    /// A monitor id that is not a number selects the first monitor.
    #[must_use]
    pub fn placement(&self) -> Option<PlacementRequest> {
        self.move_window.then(|| PlacementRequest {
            monitor_index: self.monitor_id.trim().parse().unwrap_or(0),
            window_mode: self.window_mode,
            force_focus: self.force_focus,
        })
    }

    /// Drop rules with an empty path and anchor relative paths at `base`.
    pub(super) fn normalize_rules(&mut self, base: &Path) {
        self.rules.retain(|r| {
            !r.source.as_os_str().is_empty() && !r.destination.as_os_str().is_empty()
        });
        for rule in &mut self.rules {
            if rule.source.is_relative() {
                rule.source = base.join(&rule.source);
            }
            if rule.destination.is_relative() {
                rule.destination = base.join(&rule.destination);
            }
        }
    }
}
