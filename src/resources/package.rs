//! Debian package resource.
use std::collections::HashSet;

use anyhow::Result;

use super::{Applicable, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Environment passed to every apt invocation.
const APT_ENV: &[(&str, &str)] = &[("DEBIAN_FRONTEND", "noninteractive")];

/// An apt package that should be installed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name.
    pub name: String,
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub const fn new(name: String, executor: &'a dyn Executor) -> Self {
        Self { name, executor }
    }

    /// Determine the resource state from a pre-fetched set of installed package names.
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.name) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

/// Query the set of fully installed package names with a single `dpkg-query`.
///
/// Only packages whose status is `install ok installed` are included, so
/// removed-but-not-purged (`deinstall ok config-files`) entries count as
/// missing.
///
/// # Errors
///
/// Returns an error if `dpkg-query` cannot be spawned.
pub fn get_installed_packages(executor: &dyn Executor) -> Result<HashSet<String>> {
    // dpkg-query exits 1 when some pattern matched nothing; with no patterns
    // it lists everything and a failure just means an empty database.
    let result = executor.run_unchecked("dpkg-query", &["-W", "-f", "${Package} ${Status}\\n"])?;
    let mut set = HashSet::new();
    if result.success {
        for line in result.stdout.lines() {
            if let Some((name, status)) = line.split_once(' ')
                && status.trim() == "install ok installed"
            {
                // Multi-arch packages are reported as `name:arch`.
                let name = name.split(':').next().unwrap_or(name);
                set.insert(name.to_string());
            }
        }
    }
    Ok(set)
}

/// Install a batch of packages with one `apt-get update` and one
/// `apt-get install`.
///
/// # Errors
///
/// Returns an error if either apt invocation fails.
pub fn batch_install_packages(executor: &dyn Executor, names: &[&str]) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    executor.run_with_env("apt-get", &["update"], APT_ENV)?;
    let mut args = vec!["install", "-y", "--no-install-recommends"];
    args.extend_from_slice(names);
    executor.run_with_env("apt-get", &args, APT_ENV)?;
    Ok(())
}

impl Applicable for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} (apt)", self.name)
    }

    fn apply(&self) -> Result<ResourceChange> {
        batch_install_packages(self.executor, &[self.name.as_str()])?;
        Ok(ResourceChange::Applied)
    }
}
