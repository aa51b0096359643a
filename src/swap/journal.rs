//! On-disk session journal and crash recovery.
//!
//! Apply keeps `session.json` in the session directory up to date, writing
//! it before each destination is overwritten. If the launcher dies between
//! apply and restore, the journal still says how to undo every file that
//! was touched, and [`SwapEngine::recover`] replays the restore.
use anyhow::{Context as _, Result};
use std::path::Path;

use super::paths::staging_path;
use super::{RestoreReport, Session, SessionId, SwapEngine};
use crate::operations::FileSystemOps;

/// File name of the journal inside a session directory.
pub const JOURNAL_FILE: &str = "session.json";

/// Persist `session` into `session_dir`.
///
/// Staged to a sibling file and renamed into place so a crash never leaves a
/// half-written journal. Failures are logged and otherwise ignored.
pub(super) fn write(fs: &dyn FileSystemOps, session_dir: &Path, session: &Session) {
    let path = session_dir.join(JOURNAL_FILE);
    let bytes = match serde_json::to_vec_pretty(session) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("session {}: cannot serialize journal: {e}", session.id());
            return;
        }
    };
    let tmp = staging_path(&path);
    let result = fs.write(&tmp, &bytes).and_then(|()| fs.rename(&tmp, &path));
    if let Err(e) = result {
        tracing::warn!("session {}: cannot write journal {}: {e}", session.id(), path.display());
    }
}

/// Load the journal stored in `session_dir`.
///
/// # Errors
///
/// Returns an error if the journal cannot be read or parsed.
pub fn read(fs: &dyn FileSystemOps, session_dir: &Path) -> Result<Session> {
    let path = session_dir.join(JOURNAL_FILE);
    let text = fs
        .read_to_string(&path)
        .with_context(|| format!("reading journal {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing journal {}", path.display()))
}

/// What [`SwapEngine::recover`] did with one leftover session directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The journal was replayed through restore.
    Restored(RestoreReport),
    /// The directory held nothing and was removed.
    RemovedEmpty,
    /// The directory holds files but no journal; it was left in place.
    NoJournal,
    /// The journal exists but could not be loaded; the directory was left
    /// in place.
    Unreadable {
        /// Load error message.
        reason: String,
    },
}

/// A session directory found by [`SwapEngine::recover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredSession {
    /// Session identifier (the directory name).
    pub id: SessionId,
    /// What was done with it.
    pub outcome: RecoveryOutcome,
}

impl SwapEngine {
    /// Session directories currently present under the backups root, oldest
    /// first.
    ///
    /// A session that has been restored has no directory, so anything listed
    /// here either belongs to a launch still running or was orphaned by a
    /// launcher that exited without restoring.
    #[must_use]
    pub fn orphans(&self) -> Vec<SessionId> {
        let Ok(children) = self.fs.read_dir(self.backups_root()) else {
            return Vec::new();
        };
        let mut ids: Vec<SessionId> = children
            .iter()
            .filter(|p| self.fs.is_dir(p))
            .filter_map(|p| p.file_name())
            .map(|name| SessionId::from_raw(name.to_string_lossy()))
            .collect();
        ids.sort();
        ids
    }

    /// Restore every session left under the backups root.
    ///
    /// Must only run while no launch using this backups root is in
    /// progress, otherwise the files of a running title are put back under
    /// it.
    #[must_use]
    pub fn recover(&self) -> Vec<RecoveredSession> {
        self.orphans()
            .into_iter()
            .map(|id| {
                let outcome = self.recover_one(&id);
                RecoveredSession { id, outcome }
            })
            .collect()
    }

    fn recover_one(&self, id: &SessionId) -> RecoveryOutcome {
        let dir = self.session_dir(id);
        if self.fs.exists(&dir.join(JOURNAL_FILE)) {
            return match read(self.fs.as_ref(), &dir) {
                Ok(session) if session.id() == id => {
                    tracing::info!(
                        "session {id}: restoring {} entr(ies) from journal",
                        session.backups().len()
                    );
                    RecoveryOutcome::Restored(self.restore(session))
                }
                Ok(session) => RecoveryOutcome::Unreadable {
                    reason: format!("journal belongs to session {}", session.id()),
                },
                Err(e) => {
                    tracing::warn!("session {id}: {e:#}");
                    RecoveryOutcome::Unreadable {
                        reason: format!("{e:#}"),
                    }
                }
            };
        }

        let is_empty = self.fs.read_dir(&dir).is_ok_and(|c| c.is_empty());
        if is_empty && self.fs.remove_dir_all(&dir).is_ok() {
            RecoveryOutcome::RemovedEmpty
        } else {
            tracing::warn!("session {id}: no journal in {}; leaving it alone", dir.display());
            RecoveryOutcome::NoJournal
        }
    }
}
