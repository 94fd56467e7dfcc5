//! Command: provision a fresh or partially configured device.
use std::sync::Arc;

use anyhow::Result;

use super::{Host, require_root, resolve_user, run_tasks_to_completion};
use crate::config::Config;
use crate::logging::Logger;
use crate::tasks;

/// Run the install command.
///
/// `repo_url` overrides the configured repository URL. Preflight (root
/// check, runtime-user resolution) happens before any task, so a failed
/// precondition leaves the host untouched.
///
/// # Errors
///
/// Returns an error if a precondition fails or any task fails.
pub fn run(
    mut config: Config,
    repo_url: Option<String>,
    host: &Host,
    log: &Arc<Logger>,
) -> Result<()> {
    log.info(&format!("bbx-provision {}", super::version::VERSION));

    log.stage("Preflight");
    require_root(host)?;
    let user = resolve_user(&config, host, log)?;

    if repo_url.is_some() {
        config.repo_url = repo_url;
    }
    log.debug(&format!(
        "install dir {}, branch {}, sync policy {}",
        config.install_dir.display(),
        config.branch,
        config.sync_policy
    ));

    run_tasks_to_completion(&tasks::all_install_tasks(), config, user, host, log)
}
