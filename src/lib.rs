//! Transactional configuration swapping for game launches.
//!
//! Before a title starts, the files named by a display profile's rules are
//! swapped in over the live configuration; when it exits (or fails to start)
//! the originals are put back. Every swap is journaled so that a launcher
//! crash can be undone later with [`swap::SwapEngine::recover`].
//!
//! The public API is organised into layers:
//!
//! - **[`swap`]**: apply and restore rule sets, session journal, recovery
//! - **[`launch`]**: apply, spawn and restore as one operation
//! - **[`config`]**: parse and validate `launcher.toml`
//! - **[`commands`]**: top-level subcommand orchestration (`launch`, `list`, `recover`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod launch;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod swap;
