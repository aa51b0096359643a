//! Session records produced by apply and consumed by restore.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-process sequence number mixed into every [`SessionId`].
///
/// Starts at zero on every process start.
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Unique identifier of one apply operation.
///
/// Formatted as `<utc-millis>-<pid>-<sequence>`. The millisecond prefix keeps
/// session directories sorted by creation time; the process id separates
/// concurrent launchers and the sequence separates sessions created within
/// the same millisecond by one process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{millis}-{}-{seq}", std::process::id()))
    }

    /// Wrap an existing identifier (e.g. a session directory name).
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happened to one destination during apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwapOutcome {
    /// Backup (when needed) and overwrite both succeeded.
    Applied,
    /// The destination existed but could not be backed up; the overwrite
    /// still happened, so the original content is lost for this file.
    Degraded,
    /// The overwrite failed. `rolled_back` is `true` when the backup was
    /// copied back onto the destination afterwards.
    Failed {
        /// Whether the single-file rollback succeeded.
        rolled_back: bool,
    },
    /// The overwrite had not finished. Only seen in a journal left behind by
    /// an interrupted apply.
    Pending,
}

impl fmt::Display for SwapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::Degraded => write!(f, "applied without backup"),
            Self::Failed { rolled_back: true } => write!(f, "failed, rolled back"),
            Self::Failed { rolled_back: false } => write!(f, "failed"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// Record of how to undo the swap of one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    pub(super) rule_index: usize,
    pub(super) destination: PathBuf,
    pub(super) existed_before: bool,
    pub(super) backup_path: Option<PathBuf>,
    pub(super) outcome: SwapOutcome,
}

impl BackupEntry {
    /// Position of the originating rule in the list passed to apply.
    #[must_use]
    pub const fn rule_index(&self) -> usize {
        self.rule_index
    }

    /// Absolute path of the swapped destination.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Whether the destination existed before the swap.
    #[must_use]
    pub const fn existed_before(&self) -> bool {
        self.existed_before
    }

    /// Location of the pre-swap copy, if one was taken.
    #[must_use]
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Outcome recorded at apply time.
    #[must_use]
    pub const fn outcome(&self) -> SwapOutcome {
        self.outcome
    }

    /// `true` when restore cannot bring back the original content.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.existed_before && self.backup_path.is_none()
    }
}

/// Why a rule produced no [`BackupEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The rule is disabled.
    Disabled,
    /// The source or destination path is empty.
    EmptyPath,
    /// The source file does not exist.
    SourceMissing,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::EmptyPath => write!(f, "empty source or destination"),
            Self::SourceMissing => write!(f, "source does not exist"),
        }
    }
}

/// A rule that apply ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRule {
    /// Position of the rule in the list passed to apply.
    pub rule_index: usize,
    /// Why it was ignored.
    pub reason: SkipReason,
}

/// The record of one apply; the only handle that can reverse it.
///
/// Pass it back to [`SwapEngine::restore`](super::SwapEngine::restore)
/// exactly once, after the launched process has exited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "a session must be passed to restore() to put the original files back"]
pub struct Session {
    pub(super) id: SessionId,
    pub(super) backups: Vec<BackupEntry>,
    #[serde(default)]
    pub(super) skipped: Vec<SkippedRule>,
}

impl Session {
    pub(super) const fn new(id: SessionId) -> Self {
        Self {
            id,
            backups: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Identifier naming this session's backup directory.
    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Entries in the order their rules were applied.
    #[must_use]
    pub fn backups(&self) -> &[BackupEntry] {
        &self.backups
    }

    /// Rules that were ignored, in input order.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedRule] {
        &self.skipped
    }

    /// `true` when no destination was touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backups.is_empty()
    }

    /// Entries whose original content could not be saved.
    pub fn degraded(&self) -> impl Iterator<Item = &BackupEntry> {
        self.backups.iter().filter(|e| e.is_degraded())
    }
}

/// Result of undoing one [`BackupEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreStatus {
    /// The backup was copied back onto the destination.
    Restored,
    /// The destination did not exist before the swap and was deleted.
    Removed,
    /// The destination did not exist before the swap and is already gone.
    AlreadyAbsent,
    /// No backup is available; the swapped content was left in place.
    Unrecoverable,
    /// The copy-back or delete failed.
    Failed {
        /// Error message of the failed operation.
        reason: String,
    },
}

impl fmt::Display for RestoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restored => write!(f, "restored"),
            Self::Removed => write!(f, "removed"),
            Self::AlreadyAbsent => write!(f, "already absent"),
            Self::Unrecoverable => write!(f, "no backup, left swapped"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// One line of a [`RestoreReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredEntry {
    /// Destination that was processed.
    pub destination: PathBuf,
    /// What restore did with it.
    pub status: RestoreStatus,
}

/// Outcome of a restore. Restore never fails as a whole; this report is the
/// only place partial failures show up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// Session that was restored.
    pub session: SessionId,
    /// One line per backup entry, in the session's recorded order.
    pub entries: Vec<RestoredEntry>,
    /// Whether the session's backup directory is gone.
    pub backup_dir_removed: bool,
}

impl RestoreReport {
    /// `true` when every destination is back in its pre-apply state.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|e| {
            matches!(
                e.status,
                RestoreStatus::Restored | RestoreStatus::Removed | RestoreStatus::AlreadyAbsent
            )
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_unique_within_one_millisecond() {
        let ids: HashSet<SessionId> = (0..1000).map(|_| SessionId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn generated_id_embeds_process_id() {
        let id = SessionId::generate();
        let parts: Vec<&str> = id.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], std::process::id().to_string());
        assert!(parts[0].parse::<i64>().is_ok());
    }

    #[test]
    fn degraded_entry_detection() {
        let entry = BackupEntry {
            rule_index: 0,
            destination: PathBuf::from("/x"),
            existed_before: true,
            backup_path: None,
            outcome: SwapOutcome::Degraded,
        };
        assert!(entry.is_degraded());

        let created = BackupEntry {
            existed_before: false,
            ..entry
        };
        assert!(!created.is_degraded());
    }

    #[test]
    fn session_serializes_outcomes_with_tags() {
        let mut session = Session::new(SessionId::from_raw("1-2-3"));
        session.backups.push(BackupEntry {
            rule_index: 1,
            destination: PathBuf::from("/dst"),
            existed_before: true,
            backup_path: Some(PathBuf::from("/b/1__dst")),
            outcome: SwapOutcome::Failed { rolled_back: true },
        });
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"id\":\"1-2-3\""));
        assert!(json.contains("\"kind\":\"failed\""));
        assert!(json.contains("\"rolled_back\":true"));

        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn report_with_unrecoverable_entry_is_not_clean() {
        let report = RestoreReport {
            session: SessionId::from_raw("s"),
            entries: vec![
                RestoredEntry {
                    destination: PathBuf::from("/a"),
                    status: RestoreStatus::Restored,
                },
                RestoredEntry {
                    destination: PathBuf::from("/b"),
                    status: RestoreStatus::Unrecoverable,
                },
            ],
            backup_dir_removed: true,
        };
        assert!(!report.is_clean());
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(SkipReason::SourceMissing.to_string(), "source does not exist");
        assert_eq!(SkipReason::Disabled.to_string(), "disabled");
    }
}
