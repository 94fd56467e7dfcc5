//! Task: create the device identity file on first run.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::identity;
use crate::resources::identity_file::IdentityFileResource;
use crate::resources::{Resource as _, ResourceChange};

/// Write `device.json` if it does not exist yet.
#[derive(Debug)]
pub struct EnsureIdentity;

impl Task for EnsureIdentity {
    fn name(&self) -> &'static str {
        "Ensure device identity"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let path = &ctx.config.identity_path;
        let resource = IdentityFileResource::new(path.clone());
        match resource.converge()? {
            ResourceChange::Skipped { reason } => {
                ctx.log.warn(&format!("{}: {reason}", path.display()));
                Ok(TaskResult::Skipped(reason))
            }
            change => {
                let id = identity::load(path)?;
                if change == ResourceChange::Applied {
                    ctx.log
                        .info(&format!("created device identity {}", id.device_id));
                } else {
                    ctx.log.info(&format!("device identity {}", id.device_id));
                }
                Ok(TaskResult::Ok)
            }
        }
    }
}
