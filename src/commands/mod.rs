//! Subcommand orchestration: preflight checks, then the task pipeline.
pub mod identity;
pub mod install;
pub mod update;
pub mod version;

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::error::ProvisionError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context, Task};
use crate::users::{self, RuntimeUser};

/// What a command needs from the machine it provisions.
#[derive(Debug, Clone)]
pub struct Host {
    /// Runs every external tool.
    pub executor: Arc<dyn Executor>,
    /// Value of `SUDO_USER`, the account that invoked `sudo`.
    pub sudo_user: Option<String>,
}

impl Host {
    /// The real host: system processes and the current environment.
    #[must_use]
    pub fn system() -> Self {
        Self {
            executor: Arc::new(SystemExecutor),
            sudo_user: std::env::var("SUDO_USER").ok(),
        }
    }
}

/// Resolve the runtime user from the configured candidate order.
///
/// # Errors
///
/// Returns [`ProvisionError::Config`] if no candidate resolves.
pub fn resolve_user(
    config: &Config,
    host: &Host,
    log: &Logger,
) -> Result<RuntimeUser, ProvisionError> {
    let candidates = users::default_candidates(config);
    let sudo_user = host.sudo_user.as_deref();
    let user = users::resolve(&candidates, &*host.executor, sudo_user)?;
    log.info(&format!("runtime user: {} (uid {})", user.name, user.uid));
    Ok(user)
}

/// Fail unless running as root.
///
/// # Errors
///
/// Returns [`ProvisionError::Permission`] if the effective uid is not 0.
pub fn require_root(host: &Host) -> Result<(), ProvisionError> {
    users::require_root(&*host.executor)?;
    Ok(())
}

/// Execute `tasks` in order, print the summary, and return the first failure.
///
/// # Errors
///
/// Returns the error of the first failing task.
pub fn run_tasks_to_completion(
    tasks: &[Box<dyn Task>],
    config: Config,
    user: RuntimeUser,
    host: &Host,
    log: &Arc<Logger>,
) -> Result<()> {
    let ctx = Context::new(
        Arc::new(config),
        user,
        Arc::clone(log) as Arc<dyn Log>,
        Arc::clone(&host.executor),
    );
    let result = tasks::run_pipeline(tasks, &ctx);
    log.print_summary();
    if result.is_err() {
        log.info("re-run once the problem is fixed; completed steps are not repeated");
    }
    result
}
