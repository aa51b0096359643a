//! Platform detection, default directories and optional OS capabilities.
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux and other Unix-like systems.
    Linux,
    /// Microsoft Windows.
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// How a launched window should be presented on its monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    /// Undecorated window covering the monitor.
    #[default]
    Borderless,
    /// Exclusive fullscreen; placed like borderless.
    Fullscreen,
    /// Decorated window, moved but not restyled.
    Windowed,
}

impl WindowMode {
    /// Whether the window decorations should be stripped.
    #[must_use]
    pub const fn is_borderless(self) -> bool {
        matches!(self, Self::Borderless | Self::Fullscreen)
    }
}

/// What a launch asks of the window-placement capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRequest {
    /// Zero-based index of the target monitor.
    pub monitor_index: usize,
    /// Presentation of the window on that monitor.
    pub window_mode: WindowMode,
    /// Bring the window to the foreground after moving it.
    pub force_focus: bool,
}

/// Optional capability that moves and focuses the main window of a launched
/// process.
///
/// Selected once per process by [`Platform::window_placement`]. The launcher
/// treats every failure as non-fatal.
#[cfg_attr(test, mockall::automock)]
pub trait WindowPlacement: Send + Sync {
    /// Whether this implementation can act at all.
    fn is_available(&self) -> bool;

    /// Place the main window of process `pid` as described by `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be found or moved.
    fn place(&self, pid: u32, request: &PlacementRequest) -> anyhow::Result<()>;
}

/// [`WindowPlacement`] that does nothing.
#[derive(Debug, Default)]
pub struct NoWindowPlacement;

impl WindowPlacement for NoWindowPlacement {
    fn is_available(&self) -> bool {
        false
    }

    fn place(&self, _pid: u32, _request: &PlacementRequest) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub const fn detect() -> Self {
        Self {
            os: Self::detect_os(),
        }
    }

    /// Create a platform with explicit values (for testing).
    #[cfg(test)]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    /// `true` on Windows.
    #[must_use]
    pub const fn is_windows(&self) -> bool {
        matches!(self.os, Os::Windows)
    }

    /// The window-placement capability for this platform.
    ///
    /// No platform ships an implementation; window management lives in a
    /// layer above this crate.
    #[must_use]
    pub fn window_placement(&self) -> Arc<dyn WindowPlacement> {
        tracing::debug!("no window placement backend for {}", self.os);
        Arc::new(NoWindowPlacement)
    }

    /// Directory holding `launcher.toml`.
    ///
    /// `$XDG_CONFIG_HOME/swaplaunch`, `%APPDATA%\swaplaunch` on Windows, or
    /// `~/.config/swaplaunch`.
    #[must_use]
    pub fn config_dir(&self) -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                self.is_windows()
                    .then(|| std::env::var_os("APPDATA").map(PathBuf::from))
                    .flatten()
            })
            .or_else(|| home_dir().map(|h| h.join(".config")))?;
        Some(base.join("swaplaunch"))
    }

    /// Directory for logs and backups.
    ///
    /// `$XDG_CACHE_HOME/swaplaunch`, `%LOCALAPPDATA%\swaplaunch` on Windows,
    /// or `~/.cache/swaplaunch`.
    #[must_use]
    pub fn cache_dir(&self) -> Option<PathBuf> {
        cache_dir_for(self.os)
    }

    const fn detect_os() -> Os {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            // Other Unix-like systems behave like Linux here.
            Os::Linux
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Cache directory lookup shared with the logging layer, which runs before
/// a [`Platform`] is constructed.
pub(crate) fn cache_dir_for(os: Os) -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            (os == Os::Windows)
                .then(|| std::env::var_os("LOCALAPPDATA").map(PathBuf::from))
                .flatten()
        })
        .or_else(|| home_dir().map(|h| h.join(".cache")))?;
    Some(base.join("swaplaunch"))
}
