//! Domain-specific error types for the provisioner.
//!
//! Internal modules return typed errors ([`PermissionError`],
//! [`ConfigError`], [`ExternalToolError`]) while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ProvisionError
//! ├── Permission(PermissionError)      not running with root privileges
//! ├── Config(ConfigError)              user resolution, install state, config files
//! └── ExternalTool(ExternalToolError)  a system command failed or could not start
//! ```
//!
//! Every variant maps to exit code 1; the pipeline is fail-fast and relies on
//! re-running to recover.

use thiserror::Error;

/// Top-level error type for the provisioner.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The process lacks the privileges required to provision the host.
    #[error("Permission error: {0}")]
    Permission(#[from] PermissionError),

    /// Configuration or host-state precondition error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A system command failed.
    #[error("External tool error: {0}")]
    ExternalTool(#[from] ExternalToolError),
}

/// Errors raised by the privilege check.
#[derive(Error, Debug)]
pub enum PermissionError {
    /// The effective user is not root.
    #[error("must be run as root (effective uid {euid}); re-run with sudo")]
    NotRoot {
        /// Effective uid reported by the host.
        euid: u32,
    },

    /// The effective uid could not be determined.
    #[error("cannot determine effective uid: {0}")]
    UnknownUid(String),
}

/// Errors that arise from configuration and host-state preconditions.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// None of the runtime-user candidates resolved to an account.
    #[error("no runtime user could be resolved (tried: {})", tried.join(", "))]
    NoRuntimeUser {
        /// Candidate descriptions, in the order they were tried.
        tried: Vec<String>,
    },

    /// `update` was run against a directory that is not an installed checkout.
    #[error("{path} is not an installed checkout; run `install` first")]
    NotInstalled {
        /// Install directory that was checked.
        path: String,
    },

    /// A clone is required but no repository URL was supplied.
    #[error("no repository URL: pass one to `install` or set `repo_url` in the config file")]
    MissingRepoUrl,

    /// The device identity file does not exist.
    #[error("device identity not found at {path}")]
    IdentityMissing {
        /// Expected identity file location.
        path: String,
    },

    /// The device identity file is empty or cut short by an interrupted write.
    #[error("incomplete device identity in {path}")]
    IdentityIncomplete {
        /// Identity file location.
        path: String,
    },

    /// The device identity file exists but cannot be parsed.
    #[error("invalid device identity in {path}: {message}")]
    InvalidIdentity {
        /// Identity file location.
        path: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The configuration file failed to parse or validate.
    #[error("invalid config {path}: {message}")]
    Parse {
        /// Path of the configuration file.
        path: String,
        /// Parser or validation diagnostic.
        message: String,
    },

    /// An I/O error occurred while reading a file.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised when invoking system commands.
#[derive(Error, Debug)]
pub enum ExternalToolError {
    /// The command ran and exited unsuccessfully.
    #[error("{program} failed (exit {code}): {stderr}")]
    Failed {
        /// Command label (program, optionally with its working directory).
        program: String,
        /// Exit code, or `-1` when terminated by a signal.
        code: i32,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The command could not be started at all.
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program that could not be spawned.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
