//! I2C bus enablement via `raspi-config`.
use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// The Raspberry Pi I2C interface.
///
/// `raspi-config nonint get_i2c` prints `0` when the bus is enabled and `1`
/// when it is disabled (shell truth values).
#[derive(Debug)]
pub struct I2cResource<'a> {
    executor: &'a dyn Executor,
}

impl<'a> I2cResource<'a> {
    /// Create the resource.
    #[must_use]
    pub const fn new(executor: &'a dyn Executor) -> Self {
        Self { executor }
    }
}

impl Applicable for I2cResource<'_> {
    fn description(&self) -> String {
        "i2c interface".to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor
            .run("raspi-config", &["nonint", "do_i2c", "0"])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for I2cResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.executor.which("raspi-config") {
            return Ok(ResourceState::Invalid {
                reason: "raspi-config not found".to_string(),
            });
        }
        let result = self
            .executor
            .run_unchecked("raspi-config", &["nonint", "get_i2c"])?;
        match result.stdout.trim() {
            "0" if result.success => Ok(ResourceState::Correct),
            other => Ok(ResourceState::Incorrect {
                current: if other.is_empty() {
                    "unknown".to_string()
                } else {
                    other.to_string()
                },
            }),
        }
    }
}
