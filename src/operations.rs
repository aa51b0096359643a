//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the swap engine can be
//! exercised against injected I/O failures without needing real permission
//! errors.  Production code uses [`SystemFileSystemOps`]; tests use
//! `FaultyFileSystemOps`.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction over the filesystem calls made by the swap engine.
///
/// Every method maps onto a single [`std::fs`] call (or a short sequence for
/// [`copy`](Self::copy)) and reports failures as [`io::Error`] so the engine
/// can record them per entry.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create `path` and all missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if a component cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy the bytes of `from` over `to`, creating or truncating `to`.
    ///
    /// The modification time of `from` is carried over on a best-effort
    /// basis; failing to set it does not fail the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` cannot be read or `to` cannot be written.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove the regular file (or symlink) at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove the directory at `path` and everything below it.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Write `contents` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Rename `from` to `to`, replacing `to` if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Read `path` into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Returns the immediate child paths inside `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to)?;
        // A read-only copy cannot be reopened for writing; the bytes are
        // what matter, so the timestamp is allowed to drift.
        if let Ok(modified) = std::fs::metadata(from).and_then(|m| m.modified())
            && let Ok(file) = std::fs::File::options().write(true).open(to)
        {
            file.set_modified(modified).ok();
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|e| e.map(|entry| entry.path()))
            .collect()
    }
}

/// Fault-injecting [`FileSystemOps`] for unit tests.
///
/// Delegates to [`SystemFileSystemOps`] but fails selected operations.
/// Copies are failed by matching the destination (or source) path against
/// registered substrings, so a test can break "the backup copy" or "the
/// overwrite" of one rule while the rest of the run proceeds normally.
///
/// # Example
///
/// ```ignore
/// let fs = FaultyFileSystemOps::new()
///     .fail_copy_to("0__video.cfg")   // backup of rule 0 fails
///     .fail_remove_file("created.cfg");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FaultyFileSystemOps {
    copy_to: Vec<String>,
    copy_from: Vec<String>,
    remove_file: Vec<String>,
    write: Vec<String>,
    create_dir: Vec<String>,
    copy_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl FaultyFileSystemOps {
    /// Create a mock that fails nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every copy whose destination path contains `needle`.
    #[must_use]
    pub fn fail_copy_to(mut self, needle: &str) -> Self {
        self.copy_to.push(needle.to_string());
        self
    }

    /// Fail every copy whose source path contains `needle`.
    #[must_use]
    pub fn fail_copy_from(mut self, needle: &str) -> Self {
        self.copy_from.push(needle.to_string());
        self
    }

    /// Fail every `remove_file` whose path contains `needle`.
    #[must_use]
    pub fn fail_remove_file(mut self, needle: &str) -> Self {
        self.remove_file.push(needle.to_string());
        self
    }

    /// Fail every `write` whose path contains `needle`.
    #[must_use]
    pub fn fail_write(mut self, needle: &str) -> Self {
        self.write.push(needle.to_string());
        self
    }

    /// Fail every `create_dir_all` whose path contains `needle`.
    #[must_use]
    pub fn fail_create_dir(mut self, needle: &str) -> Self {
        self.create_dir.push(needle.to_string());
        self
    }

    /// Number of copy attempts observed so far.
    pub fn copy_calls(&self) -> usize {
        self.copy_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn matches(needles: &[String], path: &Path) -> bool {
        let s = path.to_string_lossy();
        needles.iter().any(|n| s.contains(n.as_str()))
    }

    fn injected(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("injected failure: {}", path.display()),
        )
    }
}

#[cfg(test)]
impl FileSystemOps for FaultyFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if Self::matches(&self.create_dir, path) {
            return Err(Self::injected(path));
        }
        SystemFileSystemOps.create_dir_all(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.copy_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if Self::matches(&self.copy_to, to) {
            return Err(Self::injected(to));
        }
        if Self::matches(&self.copy_from, from) {
            return Err(Self::injected(from));
        }
        SystemFileSystemOps.copy(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if Self::matches(&self.remove_file, path) {
            return Err(Self::injected(path));
        }
        SystemFileSystemOps.remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        SystemFileSystemOps.remove_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if Self::matches(&self.write, path) {
            return Err(Self::injected(path));
        }
        SystemFileSystemOps.write(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        SystemFileSystemOps.rename(from, to)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        SystemFileSystemOps.read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        SystemFileSystemOps.read_dir(path)
    }
}
