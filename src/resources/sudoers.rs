//! Sudoers fragment granting the runtime user reboot and poweroff.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::helpers::fs::{file_state, replace_file};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Permission bits required by sudo for files in `/etc/sudoers.d`.
pub const SUDOERS_MODE: u32 = 0o440;

/// Commands the runtime user may run as root without a password.
pub const POWER_COMMANDS: &[&str] = &["/usr/bin/systemctl reboot", "/usr/bin/systemctl poweroff"];

/// A sudoers fragment for one user.
#[derive(Debug)]
pub struct SudoersResource<'a> {
    /// Runtime user receiving the grant.
    pub user: String,
    /// Fragment location.
    pub path: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> SudoersResource<'a> {
    /// Create the resource.
    #[must_use]
    pub const fn new(user: String, path: PathBuf, executor: &'a dyn Executor) -> Self {
        Self {
            user,
            path,
            executor,
        }
    }

    /// The fragment text.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "# Managed by bbx-provision; local edits are overwritten.\n{} ALL=(root) NOPASSWD: {}\n",
            self.user,
            POWER_COMMANDS.join(", ")
        )
    }

    /// Run `visudo -cf` on a staged fragment when visudo is available.
    fn validate(&self, staged: &Path) -> Result<()> {
        if self.executor.which("visudo") {
            let staged = staged.to_string_lossy();
            self.executor.run("visudo", &["-cf", &staged])?;
        }
        Ok(())
    }
}

impl Applicable for SudoersResource<'_> {
    fn description(&self) -> String {
        format!("sudoers {}", self.path.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        replace_file(&self.path, &self.render(), SUDOERS_MODE, |staged| {
            self.validate(staged)
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SudoersResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        file_state(&self.path, &self.render(), SUDOERS_MODE)
    }
}
