//! Task: install OS packages.
use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::resources::ResourceState;
use crate::resources::package::{PackageResource, batch_install_packages, get_installed_packages};

/// Install every configured package that is not already installed.
///
/// The installed set is queried once; missing packages are installed in a
/// single apt transaction.
#[derive(Debug)]
pub struct InstallPackages;

impl Task for InstallPackages {
    fn name(&self) -> &'static str {
        "Install packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        ctx.log.debug(&format!(
            "batch-checking {} packages with a single query",
            ctx.config.packages.len()
        ));
        let installed = get_installed_packages(&*ctx.executor)?;

        let mut stats = TaskStats::new();
        let mut missing = Vec::new();
        for name in &ctx.config.packages {
            let resource = PackageResource::new(name.clone(), &*ctx.executor);
            match resource.state_from_installed(&installed) {
                ResourceState::Correct => stats.already_ok += 1,
                _ => missing.push(name.as_str()),
            }
        }

        if !missing.is_empty() {
            ctx.log.info(&format!("installing: {}", missing.join(" ")));
            batch_install_packages(&*ctx.executor, &missing)?;
            stats.changed += u32::try_from(missing.len()).unwrap_or(u32::MAX);
        }
        Ok(stats.finish(ctx))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::TestEnv;

    #[test]
    fn installs_only_missing_packages() {
        let env = TestEnv::with_executor(
            MockExecutor::new().ok("dpkg-query", "git install ok installed\n"),
        );
        let mut config = (*env.ctx.config).clone();
        config.packages = vec!["git".to_string(), "i2c-tools".to_string()];
        let ctx = env.with_config(config);

        assert_eq!(InstallPackages.run(&ctx).unwrap(), TaskResult::Ok);
        let calls = env.executor.calls();
        assert_eq!(calls[1], "apt-get update");
        assert_eq!(
            calls[2],
            "apt-get install -y --no-install-recommends i2c-tools"
        );
    }

    #[test]
    fn nothing_missing_is_a_no_op() {
        let env = TestEnv::with_executor(
            MockExecutor::new().ok("dpkg-query", "git install ok installed\n"),
        );
        let mut config = (*env.ctx.config).clone();
        config.packages = vec!["git".to_string()];
        let ctx = env.with_config(config);

        InstallPackages.run(&ctx).unwrap();
        assert!(!env.executor.called("apt-get"));
    }

    #[test]
    fn failed_install_propagates() {
        let env = TestEnv::with_executor(MockExecutor::new().fail("apt-get install"));
        assert!(InstallPackages.run(&env.ctx).is_err());
    }

    #[test]
    fn empty_list_does_not_run() {
        let env = TestEnv::new();
        let mut config = (*env.ctx.config).clone();
        config.packages.clear();
        assert!(!InstallPackages.should_run(&env.with_config(config)));
    }
}
