//! Read-only preview of what [`SwapEngine::apply`] would do.
use std::fmt;
use std::path::PathBuf;

use super::{Rule, SkipReason, SwapEngine, paths};

/// What apply would do with one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    /// Back up the existing file and overwrite it.
    Replace,
    /// Create the file; restore deletes it.
    Create,
    /// Leave the rule alone.
    Skip(SkipReason),
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Create => write!(f, "create"),
            Self::Skip(reason) => write!(f, "skip: {reason}"),
        }
    }
}

/// One rule of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRule {
    /// Position of the rule in the input list.
    pub rule_index: usize,
    /// Destination as apply would use it (absolute unless skipped).
    pub destination: PathBuf,
    /// Intended action.
    pub action: PlannedAction,
}

impl SwapEngine {
    /// Describe what [`apply`](Self::apply) would do with `rules` right now.
    ///
    /// Nothing is created or written.
    #[must_use]
    pub fn plan(&self, rules: &[Rule]) -> Vec<PlannedRule> {
        rules
            .iter()
            .enumerate()
            .map(|(rule_index, rule)| match self.resolve(rule) {
                Ok((_, destination)) => {
                    let action = if self.fs.exists(&destination) {
                        PlannedAction::Replace
                    } else {
                        PlannedAction::Create
                    };
                    PlannedRule {
                        rule_index,
                        destination,
                        action,
                    }
                }
                Err(reason) => PlannedRule {
                    rule_index,
                    destination: if rule.destination.as_os_str().is_empty() {
                        PathBuf::new()
                    } else {
                        paths::absolute(&rule.destination)
                    },
                    action: PlannedAction::Skip(reason),
                },
            })
            .collect()
    }
}
