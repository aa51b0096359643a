//! Path helpers for rule resolution and backup naming.
use std::path::{Path, PathBuf};

/// Make `path` absolute against the current directory without touching the
/// filesystem.
///
/// Falls back to the path as given when the current directory cannot be
/// determined. On Windows the result is stripped of any `\\?\` prefix.
#[must_use]
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).map_or_else(
        |_| path.to_path_buf(),
        |abs| dunce::simplified(&abs).to_path_buf(),
    )
}

/// File name used for the backup of `destination` taken for rule `index`.
///
/// The rule index prefix keeps backups of same-named files from different
/// directories apart inside one session directory.
#[must_use]
pub fn backup_file_name(index: usize, destination: &Path) -> String {
    let name = destination
        .file_name()
        .map_or_else(|| "unnamed".to_string(), |n| n.to_string_lossy().into_owned());
    format!("{index}__{name}")
}

/// Sibling path used to stage a file before renaming it into place.
#[must_use]
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(Default::default, std::ffi::OsStr::to_os_string);
    name.push(".tmp");
    path.with_file_name(name)
}
