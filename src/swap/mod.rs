//! Transactional configuration-file swapping.
//!
//! [`SwapEngine::apply`] substitutes each rule's source over its destination
//! after saving the destination into a per-session backup directory, and
//! returns a [`Session`] describing how to undo every touch.
//! [`SwapEngine::restore`] consumes that session, puts the originals back and
//! deletes the backup directory.
//!
//! Neither call fails. Filesystem errors on individual rules are absorbed and
//! recorded in the session ([`SwapOutcome`], [`SkipReason`]) or in the
//! [`RestoreReport`] so the launcher can always proceed.
//!
//! ```text
//! <backups_root>/
//! └── <session-id>/
//!     ├── session.json          journal, see [`journal`]
//!     ├── 0__video.cfg          backup of rule 0's destination
//!     └── 2__settings.ini
//! ```
pub mod claims;
pub mod journal;
pub mod paths;
mod plan;
mod rule;
mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::operations::{FileSystemOps, SystemFileSystemOps};

pub use journal::{RecoveredSession, RecoveryOutcome};
pub use plan::{PlannedAction, PlannedRule};
pub use rule::Rule;
pub use session::{
    BackupEntry, RestoreReport, RestoreStatus, RestoredEntry, Session, SessionId, SkipReason,
    SkippedRule, SwapOutcome,
};

/// Applies and reverses rule sets against a backups root.
///
/// The engine holds no per-session state; any number of sessions may be live
/// at once, each isolated in its own directory.
#[derive(Debug, Clone)]
pub struct SwapEngine {
    backups_root: PathBuf,
    fs: Arc<dyn FileSystemOps>,
}

impl SwapEngine {
    /// Create an engine storing backups under `backups_root`.
    #[must_use]
    pub fn new(backups_root: impl Into<PathBuf>) -> Self {
        Self::with_fs_ops(backups_root, Arc::new(SystemFileSystemOps))
    }

    /// Create an engine with an injected filesystem implementation.
    #[must_use]
    pub fn with_fs_ops(backups_root: impl Into<PathBuf>, fs: Arc<dyn FileSystemOps>) -> Self {
        Self {
            backups_root: backups_root.into(),
            fs,
        }
    }

    /// Directory holding one subdirectory per session.
    #[must_use]
    pub fn backups_root(&self) -> &Path {
        &self.backups_root
    }

    /// Backup directory of the session `id`.
    #[must_use]
    pub fn session_dir(&self, id: &SessionId) -> PathBuf {
        self.backups_root.join(id.as_str())
    }

    /// Swap every applicable rule in input order.
    ///
    /// Disabled rules, rules with an empty path and rules whose source does
    /// not exist are skipped and recorded in [`Session::skipped`]. Every
    /// other rule produces exactly one [`BackupEntry`], whatever happened to
    /// its backup or overwrite.
    pub fn apply(&self, rules: &[Rule]) -> Session {
        let mut session = Session::new(SessionId::generate());
        let session_dir = self.session_dir(&session.id);
        if let Err(e) = self.fs.create_dir_all(&session_dir) {
            tracing::warn!(
                "cannot create backup directory {}: {e}; existing files will not be backed up",
                session_dir.display()
            );
        }
        tracing::debug!(
            "session {}: applying {} rule(s) into {}",
            session.id,
            rules.len(),
            session_dir.display()
        );

        for (index, rule) in rules.iter().enumerate() {
            match self.resolve(rule) {
                Ok((source, destination)) => {
                    self.apply_one(&mut session, &session_dir, index, &source, &destination);
                }
                Err(reason) => {
                    tracing::debug!("rule {index} skipped ({reason}): {}", rule.description());
                    session.skipped.push(SkippedRule {
                        rule_index: index,
                        reason,
                    });
                }
            }
        }

        journal::write(self.fs.as_ref(), &session_dir, &session);
        session
    }

    /// Undo every entry of `session` and delete its backup directory.
    ///
    /// Entries are undone newest first, not in recorded order. When two
    /// rules name the same destination, the later rule backed up the earlier
    /// rule's content, so only the reverse walk leaves the destination with
    /// its pre-apply bytes. The report lists entries in recorded order.
    /// Failures are recorded in the returned report and never abort the
    /// restore.
    #[must_use]
    pub fn restore(&self, session: Session) -> RestoreReport {
        let session_dir = self.session_dir(&session.id);

        let mut entries: Vec<RestoredEntry> = session
            .backups
            .iter()
            .rev()
            .map(|entry| {
                let status = self.restore_entry(entry);
                match &status {
                    RestoreStatus::Unrecoverable => tracing::warn!(
                        "{}: original content was not backed up; leaving swapped file in place",
                        entry.destination.display()
                    ),
                    RestoreStatus::Failed { reason } => tracing::warn!(
                        "{}: restore failed: {reason}",
                        entry.destination.display()
                    ),
                    _ => tracing::debug!("{}: {status}", entry.destination.display()),
                }
                RestoredEntry {
                    destination: entry.destination.clone(),
                    status,
                }
            })
            .collect();
        entries.reverse();

        claims::release(&session.id);

        let backup_dir_removed = if self.fs.exists(&session_dir) {
            match self.fs.remove_dir_all(&session_dir) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        "cannot remove backup directory {}: {e}",
                        session_dir.display()
                    );
                    false
                }
            }
        } else {
            true
        };

        RestoreReport {
            session: session.id,
            entries,
            backup_dir_removed,
        }
    }

    /// Check a rule and return its absolute source and destination.
    fn resolve(&self, rule: &Rule) -> Result<(PathBuf, PathBuf), SkipReason> {
        if !rule.enabled {
            return Err(SkipReason::Disabled);
        }
        if rule.source.as_os_str().is_empty() || rule.destination.as_os_str().is_empty() {
            return Err(SkipReason::EmptyPath);
        }
        let source = paths::absolute(&rule.source);
        if !self.fs.exists(&source) {
            return Err(SkipReason::SourceMissing);
        }
        Ok((source, paths::absolute(&rule.destination)))
    }

    fn apply_one(
        &self,
        session: &mut Session,
        session_dir: &Path,
        index: usize,
        source: &Path,
        destination: &Path,
    ) {
        if let Some(parent) = destination.parent()
            && let Err(e) = self.fs.create_dir_all(parent)
        {
            tracing::warn!("cannot create {}: {e}", parent.display());
        }

        let existed_before = self.fs.exists(destination);
        let backup_path = if existed_before {
            let backup = session_dir.join(paths::backup_file_name(index, destination));
            match self.fs.copy(destination, &backup) {
                Ok(()) => Some(backup),
                Err(e) => {
                    tracing::warn!(
                        "{}: backup failed ({e}); original content cannot be restored",
                        destination.display()
                    );
                    None
                }
            }
        } else {
            None
        };

        session.backups.push(BackupEntry {
            rule_index: index,
            destination: destination.to_path_buf(),
            existed_before,
            backup_path: backup_path.clone(),
            outcome: SwapOutcome::Pending,
        });
        // The journal must describe this entry before the destination changes.
        journal::write(self.fs.as_ref(), session_dir, session);

        let others = claims::claim(destination, &session.id);
        if !others.is_empty() {
            let ids: Vec<&str> = others.iter().map(SessionId::as_str).collect();
            tracing::warn!(
                "{} is already swapped by session(s) {}; restores may interleave",
                destination.display(),
                ids.join(", ")
            );
        }

        let outcome = match self.fs.copy(source, destination) {
            Ok(()) if backup_path.is_none() && existed_before => SwapOutcome::Degraded,
            Ok(()) => SwapOutcome::Applied,
            Err(e) => {
                tracing::warn!(
                    "{}: overwrite from {} failed: {e}",
                    destination.display(),
                    source.display()
                );
                let rolled_back = backup_path
                    .as_deref()
                    .is_some_and(|b| self.fs.exists(b) && self.fs.copy(b, destination).is_ok());
                SwapOutcome::Failed { rolled_back }
            }
        };
        tracing::debug!("rule {index}: {} ({outcome})", destination.display());

        if let Some(entry) = session.backups.last_mut() {
            entry.outcome = outcome;
        }
    }

    fn restore_entry(&self, entry: &BackupEntry) -> RestoreStatus {
        if entry.existed_before {
            let Some(backup) = entry.backup_path.as_deref().filter(|b| self.fs.exists(b)) else {
                return RestoreStatus::Unrecoverable;
            };
            if let Some(parent) = entry.destination.parent() {
                self.fs.create_dir_all(parent).ok();
            }
            match self.fs.copy(backup, &entry.destination) {
                Ok(()) => RestoreStatus::Restored,
                Err(e) => RestoreStatus::Failed {
                    reason: e.to_string(),
                },
            }
        } else if self.fs.exists(&entry.destination) {
            match self.fs.remove_file(&entry.destination) {
                Ok(()) => RestoreStatus::Removed,
                Err(e) => RestoreStatus::Failed {
                    reason: e.to_string(),
                },
            }
        } else {
            RestoreStatus::AlreadyAbsent
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::FaultyFileSystemOps;

    /// Temp workspace with a backups root and a place for live config files.
    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn root(&self) -> PathBuf {
            self.dir.path().join("backups")
        }

        fn engine(&self) -> SwapEngine {
            SwapEngine::new(self.root())
        }

        fn faulty_engine(&self, fs: FaultyFileSystemOps) -> SwapEngine {
            SwapEngine::with_fs_ops(self.root(), Arc::new(fs))
        }

        fn file(&self, rel: &str, content: &str) -> PathBuf {
            let p = self.dir.path().join(rel);
            std::fs::create_dir_all(p.parent().unwrap()).unwrap();
            std::fs::write(&p, content).unwrap();
            p
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.dir.path().join(rel)
        }
    }

    fn read(p: &Path) -> String {
        std::fs::read_to_string(p).unwrap()
    }

    // -----------------------------------------------------------------------
    // apply
    // -----------------------------------------------------------------------

    #[test]
    fn apply_swaps_existing_destination_and_backs_it_up() {
        let fx = Fixture::new();
        let src = fx.file("profiles/tv/A.cfg", "X");
        let dst = fx.file("game/B.cfg", "Y");

        let session = fx.engine().apply(&[Rule::new(&src, &dst)]);

        assert_eq!(read(&dst), "X");
        assert_eq!(session.backups().len(), 1);
        let entry = &session.backups()[0];
        assert!(entry.existed_before());
        assert_eq!(entry.outcome(), SwapOutcome::Applied);
        let backup = entry.backup_path().expect("backup recorded");
        assert_eq!(read(backup), "Y");
        assert_eq!(backup.file_name().unwrap(), "0__B.cfg");
        assert!(backup.starts_with(fx.engine().session_dir(session.id())));

        let _ = fx.engine().restore(session);
    }

    #[test]
    fn apply_creates_missing_destination_and_parent() {
        let fx = Fixture::new();
        let src = fx.file("A.cfg", "X");
        let dst = fx.path("game/deep/cfg/new.cfg");

        let session = fx.engine().apply(&[Rule::new(&src, &dst)]);

        assert_eq!(read(&dst), "X");
        let entry = &session.backups()[0];
        assert!(!entry.existed_before());
        assert!(entry.backup_path().is_none());
        let _ = fx.engine().restore(session);
    }

    #[test]
    fn apply_skips_disabled_empty_and_missing_source_rules() {
        let fx = Fixture::new();
        let src = fx.file("A.cfg", "X");
        let dst = fx.file("B.cfg", "Y");

        let rules = vec![
            Rule::new(&src, &dst).disabled(),
            Rule::new("", &dst),
            Rule::new(&src, ""),
            Rule::new(fx.path("missing.cfg"), &dst),
        ];
        let session = fx.engine().apply(&rules);

        assert!(session.is_empty());
        assert_eq!(read(&dst), "Y");
        let reasons: Vec<SkipReason> = session.skipped().iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::Disabled,
                SkipReason::EmptyPath,
                SkipReason::EmptyPath,
                SkipReason::SourceMissing
            ]
        );
        let _ = fx.engine().restore(session);
    }

    #[test]
    fn apply_with_no_rules_returns_empty_session() {
        let fx = Fixture::new();
        let session = fx.engine().apply(&[]);
        assert!(session.is_empty());
        assert!(session.skipped().is_empty());
        let report = fx.engine().restore(session);
        assert!(report.entries.is_empty());
        assert!(report.backup_dir_removed);
    }

    #[test]
    fn same_file_names_from_different_dirs_get_distinct_backups() {
        let fx = Fixture::new();
        let src1 = fx.file("p/one.ini", "new1");
        let src2 = fx.file("p/two.ini", "new2");
        let dst1 = fx.file("a/settings.ini", "old1");
        let dst2 = fx.file("b/settings.ini", "old2");

        let session = fx
            .engine()
            .apply(&[Rule::new(&src1, &dst1), Rule::new(&src2, &dst2)]);

        let b0 = session.backups()[0].backup_path().unwrap().to_path_buf();
        let b1 = session.backups()[1].backup_path().unwrap().to_path_buf();
        assert_ne!(b0, b1);
        assert_eq!(read(&b0), "old1");
        assert_eq!(read(&b1), "old2");
        let _ = fx.engine().restore(session);
    }

    #[test]
    fn backup_failure_records_degraded_entry_and_still_swaps() {
        let fx = Fixture::new();
        let src = fx.file("A.cfg", "X");
        let dst = fx.file("B.cfg", "Y");
        let engine = fx.faulty_engine(FaultyFileSystemOps::new().fail_copy_to("0__B.cfg"));

        let session = engine.apply(&[Rule::new(&src, &dst)]);

        let entry = &session.backups()[0];
        assert!(entry.existed_before());
        assert!(entry.backup_path().is_none());
        assert_eq!(entry.outcome(), SwapOutcome::Degraded);
        assert_eq!(session.degraded().count(), 1);
        assert_eq!(read(&dst), "X");

        let report = engine.restore(session);
        assert_eq!(report.entries[0].status, RestoreStatus::Unrecoverable);
        assert_eq!(read(&dst), "X", "swapped content stays when no backup exists");
        assert!(!report.is_clean());
    }

    #[test]
    fn overwrite_failure_rolls_back_from_backup_and_continues() {
        let fx = Fixture::new();
        let bad_src = fx.file("bad_source/A.cfg", "X");
        let good_src = fx.file("good/C.cfg", "Z");
        let dst1 = fx.file("B.cfg", "Y");
        let dst2 = fx.file("D.cfg", "W");
        let engine = fx.faulty_engine(FaultyFileSystemOps::new().fail_copy_from("bad_source"));

        let session = engine.apply(&[Rule::new(&bad_src, &dst1), Rule::new(&good_src, &dst2)]);

        assert_eq!(session.backups().len(), 2);
        assert_eq!(
            session.backups()[0].outcome(),
            SwapOutcome::Failed { rolled_back: true }
        );
        assert_eq!(read(&dst1), "Y");
        assert_eq!(session.backups()[1].outcome(), SwapOutcome::Applied);
        assert_eq!(read(&dst2), "Z");

        let report = engine.restore(session);
        assert!(report.is_clean());
        assert_eq!(read(&dst1), "Y");
        assert_eq!(read(&dst2), "W");
    }

    #[test]
    fn overwrite_failure_on_new_destination_is_recorded() {
        let fx = Fixture::new();
        let src = fx.file("A.cfg", "X");
        let dst = fx.path("new.cfg");
        let engine = fx.faulty_engine(FaultyFileSystemOps::new().fail_copy_to("new.cfg"));

        let session = engine.apply(&[Rule::new(&src, &dst)]);

        assert_eq!(
            session.backups()[0].outcome(),
            SwapOutcome::Failed { rolled_back: false }
        );
        assert!(!dst.exists());
        let report = engine.restore(session);
        assert_eq!(report.entries[0].status, RestoreStatus::AlreadyAbsent);
    }

    #[test]
    fn apply_survives_unwritable_backup_root() {
        let fx = Fixture::new();
        let src = fx.file("A.cfg", "X");
        let dst = fx.file("B.cfg", "Y");
        let engine = fx.faulty_engine(
            FaultyFileSystemOps::new()
                .fail_create_dir("backups")
                .fail_write("session.json"),
        );

        let session = engine.apply(&[Rule::new(&src, &dst)]);

        assert_eq!(session.backups()[0].outcome(), SwapOutcome::Degraded);
        assert_eq!(read(&dst), "X");
        let _ = engine.restore(session);
    }

    // -----------------------------------------------------------------------
    // restore
    // -----------------------------------------------------------------------

    #[test]
    fn restore_round_trips_existing_destinations() {
        let fx = Fixture::new();
        let rules: Vec<Rule> = (0..4)
            .map(|i| {
                let src = fx.file(&format!("src/{i}.cfg"), &format!("new-{i}"));
                let dst = fx.file(&format!("dst/{i}/cfg.ini"), &format!("old-{i}"));
                Rule::new(src, dst)
            })
            .collect();

        let engine = fx.engine();
        let session = engine.apply(&rules);
        let dir = engine.session_dir(session.id());
        assert!(dir.exists());

        let report = engine.restore(session);

        assert!(report.is_clean());
        assert!(report.backup_dir_removed);
        assert!(!dir.exists());
        for (i, rule) in rules.iter().enumerate() {
            assert_eq!(read(&rule.destination), format!("old-{i}"));
        }
    }

    #[test]
    fn restore_deletes_created_destination() {
        let fx = Fixture::new();
        let src = fx.file("A.cfg", "X");
        let dst = fx.path("created.cfg");
        let engine = fx.engine();

        let session = engine.apply(&[Rule::new(&src, &dst)]);
        assert!(dst.exists());
        let report = engine.restore(session);

        assert!(!dst.exists());
        assert_eq!(report.entries[0].status, RestoreStatus::Removed);
    }

    #[test]
    fn restore_handles_destination_named_by_two_rules() {
        let fx = Fixture::new();
        let first = fx.file("first.cfg", "first");
        let second = fx.file("second.cfg", "second");
        let dst = fx.file("shared.cfg", "original");
        let engine = fx.engine();

        let session = engine.apply(&[Rule::new(&first, &dst), Rule::new(&second, &dst)]);
        assert_eq!(read(&dst), "second");
        let _ = engine.restore(session);

        assert_eq!(read(&dst), "original");
    }

    #[test]
    fn restore_handles_created_destination_named_by_two_rules() {
        let fx = Fixture::new();
        let first = fx.file("first.cfg", "first");
        let second = fx.file("second.cfg", "second");
        let dst = fx.path("fresh.cfg");
        let engine = fx.engine();

        let session = engine.apply(&[Rule::new(&first, &dst), Rule::new(&second, &dst)]);
        let _ = engine.restore(session);

        assert!(!dst.exists());
    }

    #[test]
    fn restore_continues_past_failed_entries() {
        let fx = Fixture::new();
        let src_a = fx.file("a.cfg", "A");
        let src_b = fx.file("b.cfg", "B");
        let created = fx.path("created.cfg");
        let existing = fx.file("existing.cfg", "orig");
        let engine = fx.faulty_engine(FaultyFileSystemOps::new().fail_remove_file("created.cfg"));

        let session = engine.apply(&[Rule::new(&src_a, &created), Rule::new(&src_b, &existing)]);
        let report = engine.restore(session);

        assert!(matches!(
            report.entries[0].status,
            RestoreStatus::Failed { .. }
        ));
        assert_eq!(report.entries[1].status, RestoreStatus::Restored);
        assert_eq!(read(&existing), "orig");
        assert!(report.backup_dir_removed);
    }

    #[test]
    fn restore_tolerates_missing_backup_file() {
        let fx = Fixture::new();
        let src = fx.file("A.cfg", "X");
        let dst = fx.file("B.cfg", "Y");
        let engine = fx.engine();

        let session = engine.apply(&[Rule::new(&src, &dst)]);
        std::fs::remove_dir_all(engine.session_dir(session.id())).unwrap();
        let report = engine.restore(session);

        assert_eq!(report.entries[0].status, RestoreStatus::Unrecoverable);
        assert!(report.backup_dir_removed);
        assert_eq!(read(&dst), "X");
    }

    #[test]
    fn sessions_are_isolated_and_restorable_in_any_order() {
        let fx = Fixture::new();
        let src1 = fx.file("s1.cfg", "one");
        let src2 = fx.file("s2.cfg", "two");
        let dst_a = fx.file("a.cfg", "a");
        let dst_b = fx.file("b.cfg", "b");
        let engine = fx.engine();

        let first = engine.apply(&[Rule::new(&src1, &dst_a)]);
        let second = engine.apply(&[Rule::new(&src2, &dst_b)]);
        let dir1 = engine.session_dir(first.id());
        let dir2 = engine.session_dir(second.id());
        assert_ne!(dir1, dir2);

        let _ = engine.restore(first);
        assert!(!dir1.exists());
        assert!(dir2.exists(), "restoring one session must not touch another");
        assert_eq!(read(&dst_b), "two");

        let _ = engine.restore(second);
        assert_eq!(read(&dst_a), "a");
        assert_eq!(read(&dst_b), "b");
    }

    #[test]
    fn apply_releases_claims_on_restore() {
        let fx = Fixture::new();
        let src = fx.file("A.cfg", "X");
        let dst = fx.file("B.cfg", "Y");
        let engine = fx.engine();

        let session = engine.apply(&[Rule::new(&src, &dst)]);
        let abs = paths::absolute(&dst);
        assert_eq!(claims::holders(&abs), vec![session.id().clone()]);
        let _ = engine.restore(session);
        assert!(claims::holders(&abs).is_empty());
    }
}
