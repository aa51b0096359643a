//! File substitution rules.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const fn default_enabled() -> bool {
    true
}

/// Replace `destination` with the content of `source` while a session is
/// active.
///
/// Rules are plain values owned by the caller; the engine only borrows them
/// during [`apply`](super::SwapEngine::apply).
///
/// # Examples
///
/// ```
/// use swaplaunch::swap::Rule;
///
/// let rule = Rule::new("profiles/tv/video.cfg", "/games/portal/cfg/video.cfg");
/// assert!(rule.enabled);
/// assert!(!rule.disabled().enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// File whose content is swapped in.
    pub source: PathBuf,
    /// Live configuration file that is replaced.
    pub destination: PathBuf,
    /// Disabled rules are skipped entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Rule {
    /// Create an enabled rule.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            enabled: true,
        }
    }

    /// Return the same rule with `enabled` cleared.
    #[must_use]
    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    /// Human-readable description of this rule.
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "{} <- {}",
            self.destination.display(),
            self.source.display()
        )
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn enabled_defaults_to_true_when_omitted() {
        let rule: Rule = toml::from_str("source = \"a.cfg\"\ndestination = \"b.cfg\"\n").unwrap();
        assert!(rule.enabled);
    }

    #[test]
    fn explicit_enabled_false_is_kept() {
        let rule: Rule =
            toml::from_str("source = \"a.cfg\"\ndestination = \"b.cfg\"\nenabled = false\n")
                .unwrap();
        assert!(!rule.enabled);
    }

    #[test]
    fn description_shows_direction() {
        let rule = Rule::new("src.cfg", "dst.cfg");
        assert_eq!(rule.description(), "dst.cfg <- src.cfg");
    }
}
