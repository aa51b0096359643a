use anyhow::Result;
use clap::Parser;

use swaplaunch::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if matches!(args.command, cli::Command::Version) {
        commands::version::run();
        return Ok(());
    }

    logging::init_subscriber(args.verbose, args.command.log_name());
    let log = logging::Logger::new(args.command.log_name());
    log.debug(&format!("swaplaunch {}", commands::version::version()));

    match &args.command {
        cli::Command::Launch(opts) => commands::launch::run(&args.global, opts, &log),
        cli::Command::List => commands::list::run(&args.global, &log),
        cli::Command::Recover => commands::recover::run(&args.global, &log),
        cli::Command::Version => Ok(()),
    }
}
