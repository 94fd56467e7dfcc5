//! Blackbox device provisioner.
//!
//! Converges a Raspberry-Pi-class device to its target state: OS packages,
//! I2C, a persistent device identity, the application checkout and its
//! Python environment, a sudoers grant for reboot/poweroff, and a systemd
//! service. Every step is idempotent, so re-running is the recovery path.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: TOML configuration with built-in defaults
//! - **[`resources`]**: idempotent `check + apply` primitives (packages, units, …)
//! - **[`tasks`]**: named pipeline steps wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `update`, `identity`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod identity;
pub mod logging;
pub mod resources;
pub mod tasks;
pub mod users;
