//! Launch orchestration: swap, spawn, and restore on every exit path.
//!
//! ```text
//! Idle -> Applying -> Spawning -> Running -> Restoring -> Idle
//!                         \--(spawn failed)--> Restoring -> Idle
//! ```
//!
//! Swapped files never outlive both the child process and the restore call.
use std::fmt;
use std::path::PathBuf;
use std::process::{Child, ExitStatus};
use std::sync::Arc;

use crate::config::{Game, Profile};
use crate::error::LaunchError;
use crate::exec::{self, Spawner, SystemSpawner};
use crate::platform::{NoWindowPlacement, WindowPlacement};
use crate::swap::{RestoreReport, Session, SwapEngine, paths};

/// Executable to start for a launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    /// Display name, used in errors and logs.
    pub name: String,
    /// Path to the executable.
    pub exe_path: PathBuf,
    /// Arguments passed through unchanged.
    pub args: Vec<String>,
}

impl LaunchTarget {
    /// Target with no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, exe_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            exe_path: exe_path.into(),
            args: Vec::new(),
        }
    }

    /// Executable to start, or `None` when the path is blank.
    ///
    /// Surrounding whitespace is trimmed from UTF-8 paths; other paths are
    /// used byte for byte. A relative path with a directory part is made
    /// absolute against the current directory, since the child starts in
    /// the executable's directory. Bare names are left for a `PATH` lookup.
    fn executable(&self) -> Option<PathBuf> {
        let program = self
            .exe_path
            .to_str()
            .map_or_else(|| self.exe_path.clone(), |s| PathBuf::from(s.trim()));
        if program.as_os_str().is_empty() {
            return None;
        }
        if exec::working_dir_for(&program).is_some() {
            return Some(paths::absolute(&program));
        }
        Some(program)
    }
}

impl From<&Game> for LaunchTarget {
    fn from(game: &Game) -> Self {
        Self {
            name: game.name.clone(),
            exe_path: game.exe_path.clone(),
            args: game.args.clone(),
        }
    }
}

/// Sequences swap apply, process spawn and swap restore.
#[derive(Clone)]
pub struct Launcher {
    engine: SwapEngine,
    spawner: Arc<dyn Spawner>,
    placement: Arc<dyn WindowPlacement>,
}

impl fmt::Debug for Launcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launcher")
            .field("engine", &self.engine)
            .field("spawner", &self.spawner)
            .finish_non_exhaustive()
    }
}

impl Launcher {
    /// Launcher that spawns real processes and does no window placement.
    #[must_use]
    pub fn new(engine: SwapEngine) -> Self {
        Self {
            engine,
            spawner: Arc::new(SystemSpawner),
            placement: Arc::new(NoWindowPlacement),
        }
    }

    /// Replace the process spawner.
    #[must_use]
    pub fn with_spawner(mut self, spawner: Arc<dyn Spawner>) -> Self {
        self.spawner = spawner;
        self
    }

    /// Replace the window-placement capability.
    #[must_use]
    pub fn with_placement(mut self, placement: Arc<dyn WindowPlacement>) -> Self {
        self.placement = placement;
        self
    }

    /// The swap engine used for every launch.
    #[must_use]
    pub const fn engine(&self) -> &SwapEngine {
        &self.engine
    }

    /// Apply `profile`'s rules and start `target`.
    ///
    /// The caller owns the returned child and session, and must pass the
    /// session to [`Launcher::restore`] once the child has exited.
    ///
    /// # Errors
    ///
    /// - [`LaunchError::InvalidLaunchTarget`] if the executable path is
    ///   empty. No file has been touched.
    /// - [`LaunchError::Spawn`] if the process could not be started. The
    ///   swap has already been restored; the error carries that report.
    pub fn launch_with_session(
        &self,
        target: &LaunchTarget,
        profile: &Profile,
    ) -> Result<(Child, Session), LaunchError> {
        let Some(program) = target.executable() else {
            return Err(LaunchError::InvalidLaunchTarget {
                name: target.name.clone(),
            });
        };

        let session = self.engine.apply(&profile.rules);
        tracing::debug!(
            "session {}: {} file(s) swapped for '{}'",
            session.id(),
            session.backups().len(),
            target.name
        );

        let cwd = exec::working_dir_for(&program);
        let child = match self.spawner.spawn(&program, &target.args, cwd.as_deref()) {
            Ok(child) => child,
            Err(source) => {
                tracing::debug!("spawn of {} failed; restoring", program.display());
                let cleanup = self.engine.restore(session);
                if !cleanup.is_clean() {
                    tracing::warn!(
                        "'{}' did not start and not every file could be restored",
                        target.name
                    );
                }
                return Err(LaunchError::Spawn {
                    program,
                    source,
                    cleanup,
                });
            }
        };

        self.place_window(child.id(), profile);
        Ok((child, session))
    }

    /// Undo the swap recorded in `session`.
    #[must_use]
    pub fn restore(&self, session: Session) -> RestoreReport {
        self.engine.restore(session)
    }

    /// Launch, wait for the child to exit, then restore.
    ///
    /// The restore runs however the wait ends.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Launcher::launch_with_session`], or
    /// [`LaunchError::Wait`] if waiting on the child failed.
    pub fn run_to_completion(
        &self,
        target: &LaunchTarget,
        profile: &Profile,
    ) -> Result<(ExitStatus, RestoreReport), LaunchError> {
        let (mut child, session) = self.launch_with_session(target, profile)?;
        let pid = child.id();
        tracing::debug!("waiting for '{}' (pid {pid})", target.name);
        let waited = child.wait();
        let report = self.restore(session);
        let status = waited.map_err(|source| LaunchError::Wait { pid, source })?;
        Ok((status, report))
    }

    fn place_window(&self, pid: u32, profile: &Profile) {
        let Some(request) = profile.placement() else {
            return;
        };
        if !self.placement.is_available() {
            tracing::debug!("window placement unavailable; leaving window as is");
            return;
        }
        if let Err(e) = self.placement.place(pid, &request) {
            tracing::warn!("window placement failed: {e:#}");
        }
    }
}
