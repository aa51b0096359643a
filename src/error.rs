//! Domain-specific error types for the launcher.
//!
//! Library modules return typed errors built with [`thiserror`]; command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] through
//! the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! SwapLaunchError
//! ├── Launch(LaunchError)  invalid target, spawn and wait failures
//! └── Config(ConfigError)  launcher.toml loading and lookup
//! ```
//!
//! The swap engine itself has no error type: every filesystem failure during
//! apply or restore is recorded in the session or restore report instead of
//! being raised.

use std::path::PathBuf;

use thiserror::Error;

use crate::swap::RestoreReport;

/// Top-level error type for the launcher.
#[derive(Error, Debug)]
pub enum SwapLaunchError {
    /// A launch could not be started or observed.
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    /// The launcher configuration could not be loaded or queried.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors surfaced by the launch orchestrator.
///
/// These are the only failures allowed to reach the caller. When one is
/// returned after the swap was applied, the swap has already been restored.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The executable path is empty; nothing was touched.
    #[error("invalid launch target '{name}': executable path is empty")]
    InvalidLaunchTarget {
        /// Display name of the target that was rejected.
        name: String,
    },

    /// The operating system could not start the process.
    #[error("failed to start '{}': {source}", program.display())]
    Spawn {
        /// Executable that failed to start.
        program: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
        /// Restore run after the failed start.
        cleanup: RestoreReport,
    },

    /// Waiting on a started process failed.
    #[error("failed to wait for process {pid}: {source}")]
    Wait {
        /// Process id of the child.
        pid: u32,
        /// Underlying OS error.
        source: std::io::Error,
    },
}

/// Errors that arise from loading or querying the launcher configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("IO error reading config file {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the launcher schema.
    #[error("Invalid TOML in {}: {message}", path.display())]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// No game with the requested key is configured.
    #[error("Unknown game '{0}'")]
    UnknownGame(String),

    /// The game has no profile with the requested key.
    #[error("Game '{game}' has no profile '{profile}'")]
    UnknownProfile {
        /// Game key that was looked up.
        game: String,
        /// Profile key that was not found.
        profile: String,
    },

    /// Neither an explicit path nor a home directory is available.
    #[error("cannot determine {0} directory: set HOME or pass it explicitly")]
    NoBaseDir(&'static str),
}
