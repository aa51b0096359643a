use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the launcher.
#[derive(Parser, Debug)]
#[command(
    name = "swaplaunch",
    about = "Launch games with per-display configuration files swapped in",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Launcher configuration file (default: <config dir>/swaplaunch/launcher.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the directory holding session backups
    #[arg(long, global = true)]
    pub backups_root: Option<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Swap a profile's files in, run the game, and restore them
    Launch(LaunchOpts),
    /// Show configured games and profiles
    List,
    /// Restore sessions left behind by a crashed launcher
    Recover,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Launch(_) => "launch",
            Self::List => "list",
            Self::Recover => "recover",
            Self::Version => "version",
        }
    }
}

/// Options for the `launch` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct LaunchOpts {
    /// Game key from the configuration
    pub game: String,

    /// Display profile key (default: the game's first profile)
    #[arg(short, long)]
    pub profile: Option<String>,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_launch_with_profile() {
        let cli = Cli::parse_from(["swaplaunch", "launch", "portal", "--profile", "tv"]);
        assert!(
            matches!(&cli.command, Command::Launch(_)),
            "Expected Launch command"
        );
        if let Command::Launch(opts) = cli.command {
            assert_eq!(opts.game, "portal");
            assert_eq!(opts.profile, Some("tv".to_string()));
        }
    }

    #[test]
    fn parse_launch_profile_short() {
        let cli = Cli::parse_from(["swaplaunch", "launch", "portal", "-p", "desk"]);
        assert!(matches!(
            &cli.command,
            Command::Launch(opts) if opts.profile.as_deref() == Some("desk")
        ));
    }

    #[test]
    fn parse_launch_without_profile() {
        let cli = Cli::parse_from(["swaplaunch", "launch", "portal"]);
        assert!(matches!(
            &cli.command,
            Command::Launch(opts) if opts.profile.is_none()
        ));
    }

    #[test]
    fn launch_requires_game() {
        assert!(Cli::try_parse_from(["swaplaunch", "launch"]).is_err());
    }

    #[test]
    fn parse_dry_run_short() {
        let cli = Cli::parse_from(["swaplaunch", "-d", "launch", "portal"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "swaplaunch",
            "recover",
            "--backups-root",
            "/tmp/b",
            "--config",
            "/tmp/l.toml",
            "-v",
        ]);
        assert!(matches!(cli.command, Command::Recover));
        assert_eq!(cli.global.backups_root, Some(PathBuf::from("/tmp/b")));
        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/l.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_list_and_version() {
        assert!(matches!(
            Cli::parse_from(["swaplaunch", "list"]).command,
            Command::List
        ));
        assert!(matches!(
            Cli::parse_from(["swaplaunch", "version"]).command,
            Command::Version
        ));
    }

    #[test]
    fn log_names_match_subcommands() {
        let cli = Cli::parse_from(["swaplaunch", "launch", "portal"]);
        assert_eq!(cli.command.log_name(), "launch");
        assert_eq!(Command::Recover.log_name(), "recover");
    }
}
