//! Tasks: hardware bus enablement and device-group membership.
use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats, process_resources};
use crate::resources::group::GroupMembershipResource;
use crate::resources::i2c::I2cResource;
use crate::resources::{Applicable as _, Resource as _, ResourceChange};

/// Enable the I2C interface through `raspi-config`.
#[derive(Debug)]
pub struct EnableI2c;

impl Task for EnableI2c {
    fn name(&self) -> &'static str {
        "Enable I2C"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resource = I2cResource::new(&*ctx.executor);
        let change = resource.converge()?;
        let mut stats = TaskStats::new();
        stats.record(ctx, &resource.description(), &change);
        match change {
            ResourceChange::Skipped { reason } => Ok(TaskResult::Skipped(reason)),
            ResourceChange::Applied | ResourceChange::AlreadyCorrect => Ok(stats.finish(ctx)),
        }
    }
}

/// Add the runtime user to each configured hardware group that exists.
#[derive(Debug)]
pub struct JoinHardwareGroups;

impl Task for JoinHardwareGroups {
    fn name(&self) -> &'static str {
        "Join hardware groups"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.hardware_groups.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let user = ctx.user_name();
        let executor = &*ctx.executor;
        let resources = ctx.config.hardware_groups.iter().map(|group| {
            GroupMembershipResource::new(user.to_string(), group.clone(), executor)
        });
        process_resources(ctx, resources)
    }
}
