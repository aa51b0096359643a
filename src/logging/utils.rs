//! Helpers shared by the console and file layers.
use std::fs;
use std::path::PathBuf;

use crate::platform::{self, Platform};

/// `strftime` pattern for the log-file run header.
pub(super) const HEADER_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// `strftime` pattern for per-line log-file timestamps.
pub(super) const LINE_TIMESTAMP: &str = "%H:%M:%S";

/// Current UTC time rendered with `pattern`.
pub(super) fn utc_now(pattern: &str) -> String {
    chrono::Utc::now().format(pattern).to_string()
}

/// Remove terminal escape sequences so the log file stays plain text.
///
/// A CSI sequence (`ESC [`) runs up to its final byte in `@`..=`~`; any
/// other escape consumes the single character after `ESC`.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut pieces = s.split('\x1b');
    let mut out = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        let rest = match piece.strip_prefix('[') {
            Some(csi) => csi
                .find(|c: char| ('@'..='~').contains(&c))
                .and_then(|end| csi.get(end + 1..))
                .unwrap_or_default(),
            None => piece
                .char_indices()
                .nth(1)
                .and_then(|(i, _)| piece.get(i..))
                .unwrap_or_default(),
        };
        out.push_str(rest);
    }
    out
}

/// `<cache dir>/<command>.log`, creating the cache directory on demand.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = platform::cache_dir_for(Platform::detect().os)?;
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colours() {
        assert_eq!(strip_ansi("\x1b[33mWARN\x1b[0m  restore"), "WARN  restore");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mLaunching Portal\x1b[0m"),
            "==> Launching Portal"
        );
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn strip_ansi_drops_cursor_and_short_escapes() {
        assert_eq!(strip_ansi("\x1b[2;5Hdone"), "done");
        assert_eq!(strip_ansi("\x1b[Kline"), "line");
        assert_eq!(strip_ansi("\x1bMup"), "up");
        assert_eq!(strip_ansi("trailing\x1b"), "trailing");
        assert_eq!(strip_ansi("cut\x1b[12"), "cut");
    }

    #[test]
    fn log_file_lives_in_cache_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = super::super::with_cache_home(tmp.path(), || log_file_path("recover"));
        assert_eq!(path, Some(tmp.path().join("swaplaunch").join("recover.log")));
        assert!(tmp.path().join("swaplaunch").is_dir());
    }

    #[test]
    fn timestamps_follow_patterns() {
        let line = utc_now(LINE_TIMESTAMP);
        assert_eq!(line.len(), 8);
        assert_eq!(line.matches(':').count(), 2);

        let header = utc_now(HEADER_TIMESTAMP);
        assert_eq!(header.len(), 19);
        assert_eq!(header.chars().nth(10), Some(' '));
    }
}
