//! Child-process execution behind an injectable [`Executor`].
use anyhow::Result;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::ExternalToolError;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs system commands.
///
/// Tasks and resources never spawn processes directly; they go through an
/// `Executor` so tests can script command outcomes without touching the host.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command and return its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ExternalToolError`] if the program cannot be spawned or exits
    /// unsuccessfully.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command in a specific directory.
    ///
    /// # Errors
    ///
    /// Same as [`Executor::run`].
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with extra environment variables.
    ///
    /// # Errors
    ///
    /// Same as [`Executor::run`].
    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult>;

    /// Run a command, allowing failure (returns the result without bailing).
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

/// Spawn `cmd` and capture its output.
fn spawn(mut cmd: Command, program: &str) -> Result<ExecResult> {
    tracing::debug!("exec: {program} {:?}", cmd.get_args().collect::<Vec<_>>());
    let output = cmd.output().map_err(|source| ExternalToolError::Spawn {
        program: program.to_string(),
        source,
    })?;
    Ok(ExecResult::from(output))
}

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(cmd: Command, program: &str, label: &str) -> Result<ExecResult> {
    let result = spawn(cmd, program)?;
    if !result.success {
        return Err(ExternalToolError::Failed {
            program: label.to_string(),
            code: result.code.unwrap_or(-1),
            stderr: result.stderr.trim().to_string(),
        }
        .into());
    }
    Ok(result)
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        execute_checked(cmd, program, program)
    }

    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);
        execute_checked(cmd, program, &format!("{program} in {}", dir.display()))
    }

    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (k, v) in env {
            cmd.env(k, v);
        }
        execute_checked(cmd, program, program)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        spawn(cmd, program)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn run_echo() {
        let result = SystemExecutor.run("echo", &["hello"]).unwrap();
        assert!(result.success, "echo command should succeed");
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn run_failure_is_external_tool_error() {
        let err = SystemExecutor.run("false", &[]).unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<ExternalToolError>(),
                Some(ExternalToolError::Failed { .. })
            ),
            "non-zero exit should produce ExternalToolError::Failed, got: {err}"
        );
    }

    #[test]
    fn run_missing_program_is_spawn_error() {
        let err = SystemExecutor
            .run("this-program-does-not-exist-12345", &[])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExternalToolError>(),
            Some(ExternalToolError::Spawn { .. })
        ));
    }

    #[test]
    fn run_unchecked_failure() {
        let result = SystemExecutor.run_unchecked("false", &[]).unwrap();
        assert!(!result.success, "non-zero exit should set success=false");
    }

    #[test]
    fn run_with_env_passes_variables() {
        let env = [("BBX_TEST_VAR", "42")];
        let result = SystemExecutor
            .run_with_env("sh", &["-c", "echo $BBX_TEST_VAR"], &env)
            .unwrap();
        assert_eq!(result.stdout.trim(), "42");
    }

    #[test]
    fn run_in_uses_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemExecutor.run_in(dir.path(), "pwd", &[]).unwrap();
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn which_finds_known_program() {
        assert!(SystemExecutor.which("sh"), "sh should be found on Unix");
    }

    #[test]
    fn which_missing_program() {
        assert!(
            !SystemExecutor.which("this-program-does-not-exist-12345"),
            "non-existent program should not be found"
        );
    }
}
