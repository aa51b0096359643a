//! Process spawning behind an injectable seam.
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

use crate::swap::paths;

/// Starts external processes for the launch orchestrator.
///
/// Implement this trait to simulate spawn failures in tests without relying
/// on missing executables. The production implementation is
/// [`SystemSpawner`].
pub trait Spawner: Send + Sync + std::fmt::Debug {
    /// Start `program` with `args`, in `cwd` when given.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the process could not be started.
    fn spawn(&self, program: &Path, args: &[String], cwd: Option<&Path>) -> io::Result<Child>;
}

/// [`Spawner`] backed by [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemSpawner;

impl Spawner for SystemSpawner {
    fn spawn(&self, program: &Path, args: &[String], cwd: Option<&Path>) -> io::Result<Child> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd.spawn()
    }
}

/// Working directory for a launch: the executable's containing directory,
/// or `None` (inherit) when the path has no parent component.
#[must_use]
pub fn working_dir_for(program: &Path) -> Option<PathBuf> {
    program
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Resolve `program` to a path that can be checked for existence.
///
/// Paths with a directory component are made absolute against the current
/// directory, the same way a launch resolves them; bare names are looked up
/// on `PATH`.
#[must_use]
pub fn resolve_program(program: &Path) -> Option<PathBuf> {
    if working_dir_for(program).is_some() {
        let path = paths::absolute(program);
        return path.exists().then_some(path);
    }
    which::which(program).ok()
}
