//! Tasks: power-command grant and service registration.
use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::resources::service_unit::{UnitFileResource, UnitSpec, activate};
use crate::resources::sudoers::SudoersResource;
use crate::resources::{Applicable as _, Resource as _};

/// Allow the runtime user to reboot and power off without a password.
#[derive(Debug)]
pub struct GrantPowerCommands;

impl Task for GrantPowerCommands {
    fn name(&self) -> &'static str {
        "Grant power commands"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resource = SudoersResource::new(
            ctx.user_name().to_string(),
            ctx.config.sudoers_path.clone(),
            &*ctx.executor,
        );
        let mut stats = TaskStats::new();
        let change = resource.converge()?;
        stats.record(ctx, &resource.description(), &change);
        Ok(stats.finish(ctx))
    }
}

/// Write the unit file, then enable and restart the service.
#[derive(Debug)]
pub struct RegisterService;

impl Task for RegisterService {
    fn name(&self) -> &'static str {
        "Register service"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resource = UnitFileResource::new(
            ctx.config.unit_path(),
            UnitSpec::from_config(&ctx.config, ctx.user_name()),
        );
        let mut stats = TaskStats::new();
        let change = resource.converge()?;
        stats.record(ctx, &resource.description(), &change);

        let unit = ctx.config.unit_name();
        if activate(&*ctx.executor, &unit)? {
            ctx.log
                .debug(&format!("systemctl stop {unit} failed; service was not running"));
        }
        ctx.log.info(&format!("{unit} restarted"));
        Ok(stats.finish(ctx))
    }
}
