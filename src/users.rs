//! Privilege check and runtime-user resolution.
use std::fmt;

use crate::config::Config;
use crate::error::{ConfigError, PermissionError};
use crate::exec::Executor;

/// One way of naming a runtime-user candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateStrategy {
    /// A fixed account name.
    Named(String),
    /// The account that invoked `sudo` (`SUDO_USER`), unless it is root.
    InvokingUser,
}

impl CandidateStrategy {
    /// The account name this strategy proposes, if any.
    fn candidate(&self, sudo_user: Option<&str>) -> Option<String> {
        match self {
            Self::Named(name) => Some(name.clone()),
            Self::InvokingUser => sudo_user
                .map(str::trim)
                .filter(|u| !u.is_empty() && *u != "root")
                .map(str::to_string),
        }
    }
}

impl fmt::Display for CandidateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::InvokingUser => f.write_str("$SUDO_USER"),
        }
    }
}

/// The account the service runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeUser {
    /// Login name.
    pub name: String,
    /// Numeric uid reported by `id -u`.
    pub uid: u32,
}

/// Candidate order: preferred account, fallback account, invoking user.
#[must_use]
pub fn default_candidates(config: &Config) -> Vec<CandidateStrategy> {
    vec![
        CandidateStrategy::Named(config.preferred_user.clone()),
        CandidateStrategy::Named(config.fallback_user.clone()),
        CandidateStrategy::InvokingUser,
    ]
}

/// Evaluate `candidates` in order and return the first existing account.
///
/// An account exists when `id -u <name>` succeeds.
///
/// # Errors
///
/// Returns [`ConfigError::NoRuntimeUser`] if no candidate resolves.
pub fn resolve(
    candidates: &[CandidateStrategy],
    executor: &dyn Executor,
    sudo_user: Option<&str>,
) -> Result<RuntimeUser, ConfigError> {
    let mut tried = Vec::new();
    for strategy in candidates {
        let Some(name) = strategy.candidate(sudo_user) else {
            tried.push(strategy.to_string());
            continue;
        };
        tried.push(name.clone());
        let uid = executor
            .run_unchecked("id", &["-u", &name])
            .ok()
            .filter(|r| r.success)
            .and_then(|r| r.stdout.trim().parse::<u32>().ok());
        if let Some(uid) = uid {
            tracing::debug!("runtime user candidate {strategy} resolved to {name} ({uid})");
            return Ok(RuntimeUser { name, uid });
        }
    }
    Err(ConfigError::NoRuntimeUser { tried })
}

/// Fail unless the effective uid is 0.
///
/// # Errors
///
/// Returns [`PermissionError::NotRoot`] for a non-zero uid, or
/// [`PermissionError::UnknownUid`] if `id -u` cannot be run or parsed.
pub fn require_root(executor: &dyn Executor) -> Result<(), PermissionError> {
    let result = executor
        .run("id", &["-u"])
        .map_err(|e| PermissionError::UnknownUid(format!("{e:#}")))?;
    let euid = result
        .stdout
        .trim()
        .parse::<u32>()
        .map_err(|e| PermissionError::UnknownUid(format!("{:?}: {e}", result.stdout.trim())))?;
    if euid == 0 {
        Ok(())
    } else {
        Err(PermissionError::NotRoot { euid })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    fn candidates() -> Vec<CandidateStrategy> {
        default_candidates(&Config::default())
    }

    #[test]
    fn preferred_account_wins() {
        let executor = MockExecutor::new()
            .ok("id -u blackbox", "1001\n")
            .ok("id -u pi", "1000\n");
        let user = resolve(&candidates(), &executor, Some("alice")).unwrap();
        assert_eq!(
            user,
            RuntimeUser {
                name: "blackbox".to_string(),
                uid: 1001
            }
        );
        assert!(!executor.called("id -u pi"));
    }

    #[test]
    fn fallback_used_when_preferred_missing() {
        let executor = MockExecutor::new()
            .fail("id -u blackbox")
            .ok("id -u pi", "1000\n");
        let user = resolve(&candidates(), &executor, None).unwrap();
        assert_eq!(user.name, "pi");
    }

    #[test]
    fn invoking_user_is_last_resort() {
        let executor = MockExecutor::new()
            .fail("id -u blackbox")
            .fail("id -u pi")
            .ok("id -u alice", "1002\n");
        let user = resolve(&candidates(), &executor, Some("alice")).unwrap();
        assert_eq!(user.name, "alice");
    }

    #[test]
    fn root_invoker_is_ignored() {
        let executor = MockExecutor::new().fail("id -u");
        let err = resolve(&candidates(), &executor, Some("root")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no runtime user could be resolved (tried: blackbox, pi, $SUDO_USER)"
        );
        assert!(!executor.called("id -u root"));
    }

    #[test]
    fn nothing_resolves_is_config_error() {
        let executor = MockExecutor::new().fail("id -u");
        assert!(matches!(
            resolve(&candidates(), &executor, Some("bob")),
            Err(ConfigError::NoRuntimeUser { .. })
        ));
    }

    #[test]
    fn root_check_accepts_uid_zero() {
        let executor = MockExecutor::new().ok("id -u", "0\n");
        assert!(require_root(&executor).is_ok());
    }

    #[test]
    fn root_check_rejects_regular_user() {
        let executor = MockExecutor::new().ok("id -u", "1000\n");
        assert!(matches!(
            require_root(&executor),
            Err(PermissionError::NotRoot { euid: 1000 })
        ));
    }

    #[test]
    fn root_check_reports_unparseable_uid() {
        let executor = MockExecutor::new().ok("id -u", "nope\n");
        assert!(matches!(
            require_root(&executor),
            Err(PermissionError::UnknownUid(_))
        ));
    }
}
