//! Shared state handed to every task.
use std::sync::Arc;

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::users::RuntimeUser;

/// Shared context for task execution.
///
/// Built by a command after its preflight checks pass, so every task can
/// assume it runs as root with a resolved runtime user.
#[derive(Clone)]
pub struct Context {
    /// Effective configuration (CLI overrides already applied).
    pub config: Arc<Config>,
    /// Account the service runs as.
    pub user: RuntimeUser,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("user", &self.user)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub const fn new(
        config: Arc<Config>,
        user: RuntimeUser,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            config,
            user,
            log,
            executor,
        }
    }

    /// Runtime user's login name.
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user.name
    }
}
