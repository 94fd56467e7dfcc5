//! Idempotent resource primitives (check + apply pattern).
pub mod checkout;
pub mod group;
pub mod helpers;
pub mod i2c;
pub mod identity_file;
pub mod package;
pub mod service_unit;
pub mod sudoers;
pub mod venv;

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
///
/// Resources whose state is determined by a single bulk query (e.g. the
/// installed package set) implement only this trait; resources that can
/// determine their own state implement the richer [`Resource`] super-trait.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// a failing system command, or permission issues.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a resource.
///
/// # Examples
///
/// ```
/// use blackbox_provision::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "mode 644".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert_ne!(wrong, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied on this host.
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Unified interface for resources that can be checked and applied.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Resource::current_state`].
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }

    /// Check, then apply only when needed.
    ///
    /// `Invalid` states are reported as [`ResourceChange::Skipped`].
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Resource::current_state`] and
    /// [`Applicable::apply`].
    fn converge(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
            ResourceState::Missing | ResourceState::Incorrect { .. } => self.apply(),
        }
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct TestResource {
        state: ResourceState,
        applied: Cell<bool>,
    }

    impl TestResource {
        fn new(state: ResourceState) -> Self {
            Self {
                state,
                applied: Cell::new(false),
            }
        }
    }

    impl Applicable for TestResource {
        fn description(&self) -> String {
            "test resource".to_string()
        }

        fn apply(&self) -> Result<ResourceChange> {
            self.applied.set(true);
            Ok(ResourceChange::Applied)
        }
    }

    impl Resource for TestResource {
        fn current_state(&self) -> Result<ResourceState> {
            Ok(self.state.clone())
        }
    }

    #[test]
    fn needs_change_for_missing_and_incorrect() {
        let missing = TestResource::new(ResourceState::Missing);
        assert!(missing.needs_change().unwrap());
        assert!(
            TestResource::new(ResourceState::Incorrect {
                current: "wrong".to_string()
            })
            .needs_change()
            .unwrap()
        );
    }

    #[test]
    fn no_change_for_correct_or_invalid() {
        let correct = TestResource::new(ResourceState::Correct);
        assert!(!correct.needs_change().unwrap());
        assert!(
            !TestResource::new(ResourceState::Invalid {
                reason: "n/a".to_string()
            })
            .needs_change()
            .unwrap()
        );
    }

    #[test]
    fn converge_skips_correct_resource() {
        let resource = TestResource::new(ResourceState::Correct);
        assert_eq!(resource.converge().unwrap(), ResourceChange::AlreadyCorrect);
        assert!(!resource.applied.get());
    }

    #[test]
    fn converge_applies_missing_resource() {
        let resource = TestResource::new(ResourceState::Missing);
        assert_eq!(resource.converge().unwrap(), ResourceChange::Applied);
        assert!(resource.applied.get());
    }

    #[test]
    fn converge_reports_invalid_as_skipped() {
        let resource = TestResource::new(ResourceState::Invalid {
            reason: "group absent".to_string(),
        });
        assert_eq!(
            resource.converge().unwrap(),
            ResourceChange::Skipped {
                reason: "group absent".to_string()
            }
        );
        assert!(!resource.applied.get());
    }
}
