//! Command: bring an installed device up to date.
use std::sync::Arc;

use anyhow::Result;

use super::{Host, require_root, resolve_user, run_tasks_to_completion};
use crate::config::Config;
use crate::error::{ConfigError, ProvisionError};
use crate::logging::Logger;
use crate::resources::checkout::is_checkout;
use crate::tasks;

/// Run the update command.
///
/// # Errors
///
/// Returns [`ConfigError::NotInstalled`] if the install directory is not a
/// git checkout, or any preflight or task error.
pub fn run(config: Config, host: &Host, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("bbx-provision {}", super::version::VERSION));

    log.stage("Preflight");
    require_root(host)?;
    if !is_checkout(&config.install_dir) {
        return Err(ProvisionError::from(ConfigError::NotInstalled {
            path: config.install_dir.display().to_string(),
        })
        .into());
    }
    let user = resolve_user(&config, host, log)?;

    run_tasks_to_completion(&tasks::all_update_tasks(), config, user, host, log)
}
