//! systemd service unit for the device application.
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;

use super::helpers::fs::{file_state, replace_file};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::config::Config;
use crate::exec::Executor;

/// Permission bits of the unit file.
const UNIT_MODE: u32 = 0o644;

/// Seconds systemd waits before restarting a failed service.
pub const RESTART_SEC: u32 = 3;

/// Values substituted into the unit template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    /// Account the service runs as.
    pub user: String,
    /// Working directory and `BLACKBOX_ROOT`.
    pub install_dir: PathBuf,
    /// Interpreter inside the virtual environment.
    pub python: PathBuf,
    /// Application entry script.
    pub entry: PathBuf,
    /// `GPIOZERO_PIN_FACTORY` value.
    pub pin_factory: String,
}

impl UnitSpec {
    /// Unit values for `user` taken from the configuration.
    #[must_use]
    pub fn from_config(config: &Config, user: &str) -> Self {
        Self {
            user: user.to_string(),
            install_dir: config.install_dir.clone(),
            python: config.venv_python(),
            entry: config.entry_path(),
            pin_factory: config.pin_factory.clone(),
        }
    }

    /// Render the unit file.
    #[must_use]
    pub fn render(&self) -> String {
        let root = self.install_dir.display();
        let mut unit = String::new();
        unit.push_str("# Managed by bbx-provision; local edits are overwritten.\n");
        unit.push_str("[Unit]\n");
        unit.push_str("Description=Blackbox device application\n");
        unit.push_str("After=network-online.target sound.target\n");
        unit.push_str("Wants=network-online.target\n");
        unit.push('\n');
        unit.push_str("[Service]\n");
        unit.push_str("Type=simple\n");
        let _ = writeln!(unit, "User={}", self.user);
        let _ = writeln!(unit, "Group={}", self.user);
        let _ = writeln!(unit, "WorkingDirectory={root}");
        unit.push_str("Environment=PYTHONUNBUFFERED=1\n");
        let factory = &self.pin_factory;
        let _ = writeln!(unit, "Environment=GPIOZERO_PIN_FACTORY={factory}");
        let _ = writeln!(unit, "Environment=BLACKBOX_ROOT={root}");
        let _ = writeln!(
            unit,
            "ExecStart={} {}",
            self.python.display(),
            self.entry.display()
        );
        unit.push_str("Restart=on-failure\n");
        let _ = writeln!(unit, "RestartSec={RESTART_SEC}");
        unit.push('\n');
        unit.push_str("[Install]\n");
        unit.push_str("WantedBy=multi-user.target\n");
        unit
    }
}

/// The unit file on disk.
#[derive(Debug, Clone)]
pub struct UnitFileResource {
    /// Unit file location.
    pub path: PathBuf,
    /// Template values.
    pub spec: UnitSpec,
}

impl UnitFileResource {
    /// Create the resource.
    #[must_use]
    pub const fn new(path: PathBuf, spec: UnitSpec) -> Self {
        Self { path, spec }
    }
}

impl Applicable for UnitFileResource {
    fn description(&self) -> String {
        format!("unit {}", self.path.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        replace_file(&self.path, &self.spec.render(), UNIT_MODE, |_| Ok(()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for UnitFileResource {
    fn current_state(&self) -> Result<ResourceState> {
        file_state(&self.path, &self.spec.render(), UNIT_MODE)
    }
}

/// Reload systemd, enable `unit`, and (re)start it.
///
/// A failing `stop` is tolerated (the unit may not be running yet); every
/// other step must succeed. Returns `true` if `stop` failed.
///
/// # Errors
///
/// Returns an error if `daemon-reload`, `enable`, or `start` fails.
pub fn activate(executor: &dyn Executor, unit: &str) -> Result<bool> {
    executor.run("systemctl", &["daemon-reload"])?;
    executor.run("systemctl", &["enable", unit])?;
    let stop = executor.run_unchecked("systemctl", &["stop", unit])?;
    executor.run("systemctl", &["start", unit])?;
    Ok(!stop.success)
}
