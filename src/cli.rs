//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the device provisioner.
#[derive(Parser, Debug)]
#[command(
    name = "bbx-provision",
    about = "Provision and update a Blackbox device",
    version = crate::commands::version::VERSION
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: `$BBX_PROVISION_CONFIG`, then `/etc/blackbox/provision.toml`)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install packages, the application, and its service
    Install(InstallOpts),
    /// Pull the latest application and restart its service
    Update,
    /// Print the device identity
    Identity,
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, also used as the log file stem.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Update => "update",
            Self::Identity => "identity",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Repository to clone (overrides `repo_url` in the config file)
    pub repo_url: Option<String>,
}
