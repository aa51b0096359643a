// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed launcher workspace (config directory,
// game directory, backups root) and a fluent builder so each integration test
// can set up an isolated environment without repeating filesystem
// boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use swaplaunch::config::{CONFIG_FILE, Config};
use swaplaunch::swap::SwapEngine;

/// An isolated launcher workspace backed by a [`tempfile::TempDir`].
///
/// Layout:
/// - `conf/launcher.toml`  launcher configuration (written by the builder)
/// - `conf/profiles/`      profile source files
/// - `game/`               live configuration files of the fake game
/// - `backups/`            backups root
pub struct IntegrationTestContext {
    /// Temporary directory containing the workspace.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a new, empty workspace.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("conf/profiles")).expect("create conf dir");
        std::fs::create_dir_all(root.path().join("game")).expect("create game dir");
        Self { root }
    }

    /// Path to the workspace root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Path to `launcher.toml`.
    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("conf").join(CONFIG_FILE)
    }

    /// Path to the backups root.
    pub fn backups_root(&self) -> PathBuf {
        self.root.path().join("backups")
    }

    /// Path inside the workspace.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Read a workspace file as a string.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read file")
    }

    /// Load `launcher.toml`.
    pub fn load_config(&self) -> Config {
        Config::load(&self.config_path()).expect("load config")
    }

    /// Swap engine rooted at the workspace backups root.
    pub fn engine(&self) -> SwapEngine {
        SwapEngine::new(self.backups_root())
    }

    /// Number of session directories under the backups root.
    pub fn session_dirs(&self) -> usize {
        std::fs::read_dir(self.backups_root()).map_or(0, |d| d.count())
    }
}

/// Fluent builder for [`IntegrationTestContext`].
///
/// Allows individual tests to customise the workspace before the context
/// is finalised without modifying the shared setup.
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new, empty workspace.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `conf/launcher.toml`.
    pub fn with_config(self, content: &str) -> Self {
        std::fs::write(self.ctx.config_path(), content).expect("write launcher.toml");
        self
    }

    /// Create a profile source file at `conf/profiles/<rel>`.
    pub fn with_profile_file(self, rel: &str, content: &str) -> Self {
        self.ctx.write(&format!("conf/profiles/{rel}"), content);
        self
    }

    /// Create a live game file at `game/<rel>`.
    pub fn with_game_file(self, rel: &str, content: &str) -> Self {
        self.ctx.write(&format!("game/{rel}"), content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

/// A `launcher.toml` with one game whose executable is `exe` and whose `tv`
/// profile swaps `video.cfg` (existing) and `input.cfg` (created) in the
/// workspace `game/` directory.
pub fn portal_config(ctx: &IntegrationTestContext, exe: &str) -> String {
    let game = ctx.path("game");
    format!(
        r#"
[games.portal]
name = "Portal"
exe_path = "{exe}"

[[games.portal.profiles]]
key = "tv"
move_window = false

[[games.portal.profiles.rules]]
source = "profiles/tv/video.cfg"
destination = "{video}"

[[games.portal.profiles.rules]]
source = "profiles/tv/input.cfg"
destination = "{input}"

[[games.portal.profiles]]
key = "desk"
"#,
        video = toml_path(&game.join("video.cfg")),
        input = toml_path(&game.join("input.cfg")),
    )
}

/// Render a path for a TOML basic string.
pub fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}
