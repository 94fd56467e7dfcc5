//! Named pipeline steps that orchestrate resource changes.
mod context;
pub mod hardware;
pub mod identity;
pub mod packages;
mod processing;
pub mod python;
pub mod repository;
pub mod service;

pub use context::Context;
pub use processing::{TaskResult, TaskStats, process_resources};

use anyhow::Result;

use crate::logging::TaskStatus;

/// A named, executable pipeline step.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the current configuration.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails to execute, such as when system commands
    /// fail, file operations are not permitted, or configuration is invalid.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Steps run by `install`, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(packages::InstallPackages),
        Box::new(hardware::EnableI2c),
        Box::new(hardware::JoinHardwareGroups),
        Box::new(identity::EnsureIdentity),
        Box::new(repository::SyncRepository),
        Box::new(python::InstallPythonDeps),
        Box::new(repository::SetOwnership),
        Box::new(service::GrantPowerCommands),
        Box::new(service::RegisterService),
    ]
}

/// Steps run by `update`, in execution order.
#[must_use]
pub fn all_update_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(repository::SyncRepository),
        Box::new(python::InstallPythonDeps),
        Box::new(repository::SetOwnership),
        Box::new(service::RegisterService),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// # Errors
///
/// Returns the task's error, with the task name as context.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            Ok(())
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            Ok(())
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            Err(e.context(format!("{} failed", task.name())))
        }
    }
}

/// Run `tasks` in order, stopping at the first failure.
///
/// Tasks after a failure are recorded as [`TaskStatus::NotRun`]. Nothing is
/// rolled back; every step is idempotent, so re-running converges the host.
///
/// # Errors
///
/// Returns the error of the first failing task.
pub fn run_pipeline(tasks: &[Box<dyn Task>], ctx: &Context) -> Result<()> {
    for (i, task) in tasks.iter().enumerate() {
        if let Err(e) = execute(task.as_ref(), ctx) {
            for rest in tasks.iter().skip(i + 1) {
                ctx.log.record_task(rest.name(), TaskStatus::NotRun, None);
            }
            return Err(e);
        }
    }
    Ok(())
}
