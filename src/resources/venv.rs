//! Python virtual environment resource.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A virtual environment directory, created once.
#[derive(Debug)]
pub struct VenvResource<'a> {
    /// Environment root (contains `bin/python`).
    pub dir: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> VenvResource<'a> {
    /// Create the resource.
    #[must_use]
    pub const fn new(dir: PathBuf, executor: &'a dyn Executor) -> Self {
        Self { dir, executor }
    }

    /// Interpreter inside the environment.
    #[must_use]
    pub fn python(&self) -> PathBuf {
        self.dir.join("bin").join("python")
    }
}

impl Applicable for VenvResource<'_> {
    fn description(&self) -> String {
        format!("venv {}", self.dir.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let dir = self.dir.to_string_lossy();
        self.executor.run("python3", &["-m", "venv", &dir])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for VenvResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if self.python().exists() {
            Ok(ResourceState::Correct)
        } else if self.dir.exists() {
            Ok(ResourceState::Incorrect {
                current: "directory without interpreter".to_string(),
            })
        } else {
            Ok(ResourceState::Missing)
        }
    }
}

/// Upgrade pip and install `requirements` into the environment at `python`.
///
/// # Errors
///
/// Returns an error if either pip invocation fails.
pub fn install_requirements(
    executor: &dyn Executor,
    python: &Path,
    requirements: &Path,
) -> Result<()> {
    let python = python.to_string_lossy();
    let requirements = requirements.to_string_lossy();
    executor.run(
        &python,
        &[
            "-m",
            "pip",
            "install",
            "--disable-pip-version-check",
            "--upgrade",
            "pip",
        ],
    )?;
    executor.run(
        &python,
        &[
            "-m",
            "pip",
            "install",
            "--disable-pip-version-check",
            "--upgrade",
            "-r",
            &requirements,
        ],
    )?;
    Ok(())
}
