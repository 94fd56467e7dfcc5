//! Tasks: application checkout and its ownership.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::resources::checkout::{CheckoutResource, head_short_id};
use crate::resources::{Resource as _, ResourceChange};

/// Clone the application repository, or bring an existing checkout up to
/// the remote branch.
#[derive(Debug)]
pub struct SyncRepository;

impl Task for SyncRepository {
    fn name(&self) -> &'static str {
        "Sync repository"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let config = &ctx.config;
        let resource = CheckoutResource::new(
            config.install_dir.clone(),
            config.repo_url.clone(),
            config.branch.clone(),
            config.sync_policy,
            &*ctx.executor,
        );
        match resource.converge()? {
            ResourceChange::Applied => {
                ctx.log.info(&format!(
                    "cloned {} into {}",
                    config.branch,
                    config.install_dir.display()
                ));
            }
            ResourceChange::AlreadyCorrect => {
                let before = head_short_id(&config.install_dir);
                let remote = format!("origin/{}", config.branch);
                ctx.log
                    .debug(&format!("syncing with {remote} ({})", config.sync_policy));
                resource.sync()?;
                let after = head_short_id(&config.install_dir);
                if before == after {
                    ctx.log.info("already up to date");
                } else {
                    ctx.log.info("repository updated");
                }
            }
            ResourceChange::Skipped { reason } => {
                anyhow::bail!(reason);
            }
        }
        if let Some(head) = head_short_id(&config.install_dir) {
            ctx.log.debug(&format!("HEAD is {head}"));
        }
        Ok(TaskResult::Ok)
    }
}

/// Hand the checkout to the runtime user.
#[derive(Debug)]
pub struct SetOwnership;

impl Task for SetOwnership {
    fn name(&self) -> &'static str {
        "Set ownership"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let owner = format!("{0}:{0}", ctx.user_name());
        let dir = ctx.config.install_dir.to_string_lossy();
        ctx.executor.run("chown", &["-R", &owner, &dir])?;
        ctx.log.debug(&format!("{dir} owned by {owner}"));
        Ok(TaskResult::Ok)
    }
}
