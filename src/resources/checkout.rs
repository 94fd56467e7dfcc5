//! Application repository checkout: clone once, then sync to the remote branch.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::config::SyncPolicy;
use crate::error::ConfigError;
use crate::exec::Executor;

/// Whether `dir` opens as a git repository.
#[must_use]
pub fn is_checkout(dir: &Path) -> bool {
    git2::Repository::open(dir).is_ok()
}

/// Abbreviated commit id of `HEAD` in `dir`, if it can be read.
#[must_use]
pub fn head_short_id(dir: &Path) -> Option<String> {
    let repo = git2::Repository::open(dir).ok()?;
    let head = repo.head().ok()?.peel_to_commit().ok()?;
    let id = head.id().to_string();
    id.get(..12).map(str::to_string)
}

/// The install directory as a checkout of `url` on `branch`.
///
/// [`Resource::converge`] only clones a missing checkout; an existing one
/// reports [`ResourceChange::AlreadyCorrect`] and is brought up to date with
/// [`CheckoutResource::sync`].
#[derive(Debug)]
pub struct CheckoutResource<'a> {
    /// Checkout location.
    pub dir: PathBuf,
    /// Remote URL; only needed for the initial clone.
    pub url: Option<String>,
    /// Branch to track.
    pub branch: String,
    /// How to reconcile with the remote branch.
    pub policy: SyncPolicy,
    executor: &'a dyn Executor,
}

impl<'a> CheckoutResource<'a> {
    /// Create the resource.
    #[must_use]
    pub const fn new(
        dir: PathBuf,
        url: Option<String>,
        branch: String,
        policy: SyncPolicy,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            dir,
            url,
            branch,
            policy,
            executor,
        }
    }

    /// Run `git` with the checkout marked as a safe directory.
    fn git(&self, args: &[&str]) -> Result<()> {
        let dir = self.dir.to_string_lossy();
        let safe = format!("safe.directory={dir}");
        let mut full = vec!["-c", safe.as_str(), "-C", dir.as_ref()];
        full.extend_from_slice(args);
        self.executor.run("git", &full)?;
        Ok(())
    }

    /// Fetch the tracked branch and bring the working tree up to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails, or if a fast-forward is
    /// impossible under [`SyncPolicy::FastForward`].
    pub fn sync(&self) -> Result<()> {
        let remote = format!("origin/{}", self.branch);
        self.git(&["fetch", "origin", &self.branch])?;
        match self.policy {
            SyncPolicy::FastForward => self.git(&["merge", "--ff-only", &remote]),
            SyncPolicy::HardReset => self.git(&["reset", "--hard", &remote]),
        }
    }
}

impl Applicable for CheckoutResource<'_> {
    fn description(&self) -> String {
        format!("checkout {}", self.dir.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let url = self.url.as_deref().ok_or(ConfigError::MissingRepoUrl)?;
        let dir = self.dir.to_string_lossy();
        self.executor
            .run("git", &["clone", "--branch", &self.branch, url, &dir])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for CheckoutResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if is_checkout(&self.dir) {
            Ok(ResourceState::Correct)
        } else if self.dir.join(".git").exists() {
            Ok(ResourceState::Invalid {
                reason: format!(
                    "{} has a .git entry but is not a repository",
                    self.dir.display()
                ),
            })
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
