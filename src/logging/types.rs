//! Summary entry types.
use crate::swap::{RestoreStatus, SkipReason};

/// Per-file result for summary reporting.
#[derive(Debug, Clone)]
pub struct SummaryEntry {
    /// File the entry is about (normally a swap destination).
    pub name: String,
    /// Final status of the file.
    pub status: EntryStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of one file at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Swapped and put back.
    Ok,
    /// Rule was not applied.
    Skipped,
    /// Would have been swapped; nothing was touched.
    DryRun,
    /// Swapped without a backup; the original is lost.
    Degraded,
    /// Swap or restore failed.
    Failed,
}

impl EntryStatus {
    /// Every status, in summary order.
    pub const ALL: [Self; 5] = [
        Self::Ok,
        Self::Skipped,
        Self::DryRun,
        Self::Degraded,
        Self::Failed,
    ];

    /// `true` when the file did not end up in its pre-launch state.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Degraded | Self::Failed)
    }

    /// Word used in the summary totals.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Degraded => "degraded",
            Self::Failed => "failed",
        }
    }

    /// Summary icon and its ANSI colour.
    pub(super) const fn badge(self) -> (&'static str, &'static str) {
        match self {
            Self::Ok => ("✓", "\x1b[32m"),
            Self::Skipped => ("○", "\x1b[33m"),
            Self::DryRun => ("~", "\x1b[37m"),
            Self::Degraded => ("!", "\x1b[35m"),
            Self::Failed => ("✗", "\x1b[31m"),
        }
    }
}

impl From<&RestoreStatus> for EntryStatus {
    fn from(status: &RestoreStatus) -> Self {
        match status {
            RestoreStatus::Restored | RestoreStatus::Removed | RestoreStatus::AlreadyAbsent => {
                Self::Ok
            }
            RestoreStatus::Unrecoverable => Self::Degraded,
            RestoreStatus::Failed { .. } => Self::Failed,
        }
    }
}

impl From<SkipReason> for EntryStatus {
    fn from(_: SkipReason) -> Self {
        Self::Skipped
    }
}
