//! Resource processing and per-task statistics.
use anyhow::Result;

use super::context::Context;
use crate::resources::{Resource, ResourceChange};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use blackbox_provision::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("raspi-config not found".into());
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task ran but left its work undone on this host.
    Skipped(String),
}

/// Counters for tasks that converge several resources.
///
/// # Examples
///
/// ```
/// use blackbox_provision::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 0 };
/// assert_eq!(stats.summary(), "1 changed, 2 already ok");
///
/// let stats = TaskStats { changed: 0, already_ok: 2, skipped: 1 };
/// assert_eq!(stats.summary(), "0 changed, 2 already ok, 1 skipped");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of resources changed.
    pub changed: u32,
    /// Number of resources already in the desired state.
    pub already_ok: u32,
    /// Number of resources that could not be applied on this host.
    pub skipped: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self) -> String {
        if self.skipped > 0 {
            format!(
                "{} changed, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} changed, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return [`TaskResult::Ok`].
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary());
        TaskResult::Ok
    }

    /// Count one converge outcome, logging what happened to `desc`.
    pub fn record(&mut self, ctx: &Context, desc: &str, change: &ResourceChange) {
        match change {
            ResourceChange::Applied => {
                ctx.log.info(&format!("changed: {desc}"));
                self.changed += 1;
            }
            ResourceChange::AlreadyCorrect => {
                ctx.log.debug(&format!("ok: {desc}"));
                self.already_ok += 1;
            }
            ResourceChange::Skipped { reason } => {
                ctx.log.warn(&format!("skipped {desc}: {reason}"));
                self.skipped += 1;
            }
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Converge each resource in order, stopping at the first error.
///
/// # Errors
///
/// Returns the first error raised while checking or applying a resource.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let change = resource.converge()?;
        stats.record(ctx, &resource.description(), &change);
    }
    Ok(stats.finish(ctx))
}
