//! Task: Python virtual environment and application dependencies.
use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::resources::venv::{VenvResource, install_requirements};
use crate::resources::{Applicable as _, Resource as _};

/// Create the virtual environment once, then install the requirements
/// manifest with `--upgrade` on every run.
#[derive(Debug)]
pub struct InstallPythonDeps;

impl Task for InstallPythonDeps {
    fn name(&self) -> &'static str {
        "Install Python dependencies"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let venv = VenvResource::new(ctx.config.venv_dir(), &*ctx.executor);
        let mut stats = TaskStats::new();
        let change = venv.converge()?;
        stats.record(ctx, &venv.description(), &change);

        let manifest = ctx.config.requirements_path();
        if !manifest.exists() {
            let reason = format!("{} not found", manifest.display());
            ctx.log
                .warn(&format!("skipping dependency install: {reason}"));
            return Ok(TaskResult::Skipped(reason));
        }

        ctx.log
            .debug(&format!("installing requirements from {}", manifest.display()));
        install_requirements(&*ctx.executor, &venv.python(), &manifest)?;
        Ok(stats.finish(ctx))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::TestEnv;

    #[test]
    fn missing_manifest_is_skipped_after_venv() {
        let env = TestEnv::new();
        assert!(matches!(
            InstallPythonDeps.run(&env.ctx).unwrap(),
            TaskResult::Skipped(_)
        ));
        assert!(env.executor.called("python3 -m venv"));
        let calls = env.executor.calls();
        assert!(!calls.iter().any(|c| c.contains("pip install")));
    }

    #[test]
    fn manifest_installed_with_upgrade() {
        let env = TestEnv::with_executor(MockExecutor::new());
        let install_dir = &env.ctx.config.install_dir;
        std::fs::create_dir_all(install_dir).unwrap();
        std::fs::write(install_dir.join("requirements.txt"), "luma.oled\n").unwrap();
        std::fs::create_dir_all(install_dir.join(".venv/bin")).unwrap();
        std::fs::write(install_dir.join(".venv/bin/python"), "").unwrap();

        assert_eq!(InstallPythonDeps.run(&env.ctx).unwrap(), TaskResult::Ok);
        assert!(!env.executor.called("python3 -m venv"));
        let calls = env.executor.calls();
        assert!(calls.iter().any(|c| c.contains("--upgrade -r")));
    }

    #[test]
    fn failed_pip_propagates() {
        // The venv interpreter is the only absolute program path invoked.
        let env = TestEnv::with_executor(MockExecutor::new().fail("/"));
        let install_dir = &env.ctx.config.install_dir;
        std::fs::create_dir_all(install_dir).unwrap();
        std::fs::write(install_dir.join("requirements.txt"), "").unwrap();
        assert!(InstallPythonDeps.run(&env.ctx).is_err());
    }
}
