//! Device identity file resource.
use std::path::PathBuf;

use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ConfigError;
use crate::identity::{self, Ensured};

/// The identity file at a fixed path; created once, rewritten only when a
/// previous write was cut short.
#[derive(Debug, Clone)]
pub struct IdentityFileResource {
    /// Location of the identity JSON.
    pub path: PathBuf,
}

impl IdentityFileResource {
    /// Create the resource.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Applicable for IdentityFileResource {
    fn description(&self) -> String {
        format!("device identity {}", self.path.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        match identity::ensure(&self.path)? {
            Ensured::Created(_) | Ensured::Repaired(_) => Ok(ResourceChange::Applied),
            Ensured::Existing(_) => Ok(ResourceChange::AlreadyCorrect),
            Ensured::Unreadable(message) => Ok(ResourceChange::Skipped {
                reason: format!("existing file is unreadable, leaving it alone: {message}"),
            }),
        }
    }
}

impl Resource for IdentityFileResource {
    fn current_state(&self) -> Result<ResourceState> {
        match identity::load(&self.path) {
            Ok(_) => Ok(ResourceState::Correct),
            Err(ConfigError::IdentityMissing { .. }) => Ok(ResourceState::Missing),
            Err(ConfigError::IdentityIncomplete { .. }) => Ok(ResourceState::Incorrect {
                current: "incomplete write".to_string(),
            }),
            Err(ConfigError::InvalidIdentity { message, .. }) => Ok(ResourceState::Invalid {
                reason: format!("existing file is unreadable, leaving it alone: {message}"),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
