//! Supplementary group membership for the runtime user.
use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// `user` should be a member of `group`.
#[derive(Debug)]
pub struct GroupMembershipResource<'a> {
    /// Account name.
    pub user: String,
    /// Group name.
    pub group: String,
    executor: &'a dyn Executor,
}

impl<'a> GroupMembershipResource<'a> {
    /// Create a new membership resource.
    #[must_use]
    pub const fn new(user: String, group: String, executor: &'a dyn Executor) -> Self {
        Self {
            user,
            group,
            executor,
        }
    }
}

impl Applicable for GroupMembershipResource<'_> {
    fn description(&self) -> String {
        format!("{} in group {}", self.user, self.group)
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor
            .run("usermod", &["-aG", &self.group, &self.user])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for GroupMembershipResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let group = self
            .executor
            .run_unchecked("getent", &["group", &self.group])?;
        if !group.success {
            return Ok(ResourceState::Invalid {
                reason: format!("group {} does not exist", self.group),
            });
        }
        let groups = self.executor.run("id", &["-nG", &self.user])?;
        if groups.stdout.split_whitespace().any(|g| g == self.group) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
