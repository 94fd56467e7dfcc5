//! `bbx-provision` entry point.
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use blackbox_provision::cli::{self, Command};
use blackbox_provision::commands::{self, Host};
use blackbox_provision::config::Config;
use blackbox_provision::logging::{self, Logger};

/// Exit status after Ctrl-C (128 + SIGINT).
const INTERRUPTED: i32 = 130;

fn main() -> ExitCode {
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, args.command.name());

    if let Err(e) = ctrlc::set_handler(|| {
        tracing::error!("interrupted; re-run the same command to finish converging the host");
        std::process::exit(INTERRUPTED);
    }) {
        tracing::debug!("cannot install Ctrl-C handler: {e}");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: cli::Cli) -> Result<()> {
    let name = args.command.name();
    match args.command {
        Command::Version => {
            commands::version::run();
            Ok(())
        }
        Command::Identity => commands::identity::run(&Config::load(args.config.as_deref())?),
        Command::Install(opts) => {
            let config = Config::load(args.config.as_deref())?;
            let log = Arc::new(Logger::new(name));
            commands::install::run(config, opts.repo_url, &Host::system(), &log)
        }
        Command::Update => {
            let config = Config::load(args.config.as_deref())?;
            let log = Arc::new(Logger::new(name));
            commands::update::run(config, &Host::system(), &log)
        }
    }
}
