// Shared helpers for integration tests.
//
// Provides a simulated device (`FakeHost`) that answers the external tools
// the provisioner invokes and keeps just enough state (installed packages,
// I2C, group memberships, cloned checkout, venv) for repeated runs to
// observe their own earlier effects.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use blackbox_provision::commands::Host;
use blackbox_provision::config::Config;
use blackbox_provision::exec::{ExecResult, Executor};
use blackbox_provision::logging::Logger;

/// Repository URL used by install tests.
pub const REPO_URL: &str = "https://example.invalid/blackbox.git";

/// Command prefixes that only read host state.
const READ_ONLY: &[&str] = &[
    "id ",
    "getent ",
    "dpkg-query ",
    "raspi-config nonint get_i2c",
];

#[derive(Debug, Default)]
struct State {
    calls: Vec<String>,
    installed: HashSet<String>,
    i2c_enabled: bool,
    memberships: HashSet<String>,
}

/// A scripted stand-in for the device's external tools.
#[derive(Debug)]
pub struct FakeHost {
    euid: u32,
    accounts: Vec<(String, u32)>,
    failing: Vec<String>,
    state: Mutex<State>,
}

impl FakeHost {
    /// A Raspberry Pi running as root with a `blackbox` account.
    pub fn new() -> Self {
        Self {
            euid: 0,
            accounts: vec![("blackbox".to_string(), 1001)],
            failing: Vec::new(),
            state: Mutex::new(State::default()),
        }
    }

    /// Run as a non-root user.
    pub fn with_euid(mut self, euid: u32) -> Self {
        self.euid = euid;
        self
    }

    /// Replace the set of existing accounts.
    pub fn with_accounts(mut self, accounts: &[(&str, u32)]) -> Self {
        self.accounts = accounts
            .iter()
            .map(|(n, u)| ((*n).to_string(), *u))
            .collect();
        self
    }

    /// Make every command starting with `prefix` fail.
    pub fn failing(mut self, prefix: &str) -> Self {
        self.failing.push(prefix.to_string());
        self
    }

    /// Every command line issued so far.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().expect("state lock").calls.clone()
    }

    /// Commands that could change the host.
    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !READ_ONLY.iter().any(|p| c.starts_with(p)))
            .collect()
    }

    /// Whether any issued command line starts with `prefix`.
    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    /// Whether any recorded command line ends with `suffix`.
    pub fn called_ending(&self, suffix: &str) -> bool {
        self.calls().iter().any(|c| c.ends_with(suffix))
    }

    /// Forget recorded calls (host state is kept).
    pub fn clear_calls(&self) {
        self.state.lock().expect("state lock").calls.clear();
    }

    fn respond(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        let mut state = self.state.lock().expect("state lock");
        state.calls.push(line.clone());

        if self.failing.iter().any(|p| line.starts_with(p.as_str())) {
            return result(false, "");
        }

        match (program, args) {
            ("id", ["-u"]) => result(true, &format!("{}\n", self.euid)),
            ("id", ["-u", name]) => {
                let account = self.accounts.iter().find(|(n, _)| n == name);
                account.map_or_else(
                    || result(false, ""),
                    |(_, uid)| result(true, &format!("{uid}\n")),
                )
            }
            ("id", ["-nG", name]) => {
                let mut groups = vec![(*name).to_string()];
                groups.extend(state.memberships.iter().cloned());
                result(true, &format!("{}\n", groups.join(" ")))
            }
            ("dpkg-query", _) => {
                let out: String = state
                    .installed
                    .iter()
                    .map(|p| format!("{p} install ok installed\n"))
                    .collect();
                result(true, &out)
            }
            ("apt-get", ["install", rest @ ..]) => {
                for name in rest.iter().filter(|a| !a.starts_with('-')) {
                    state.installed.insert((*name).to_string());
                }
                result(true, "")
            }
            ("raspi-config", ["nonint", "get_i2c"]) => {
                result(true, if state.i2c_enabled { "0\n" } else { "1\n" })
            }
            ("raspi-config", ["nonint", "do_i2c", "0"]) => {
                state.i2c_enabled = true;
                result(true, "")
            }
            ("usermod", ["-aG", group, _]) => {
                state.memberships.insert((*group).to_string());
                result(true, "")
            }
            ("git", ["clone", .., dir]) => {
                let dir = Path::new(dir);
                git2::Repository::init(dir).expect("init fake clone");
                std::fs::write(dir.join("requirements.txt"), "luma.oled\n")
                    .expect("write requirements");
                result(true, "")
            }
            ("python3", ["-m", "venv", dir]) => {
                let bin = Path::new(dir).join("bin");
                std::fs::create_dir_all(&bin).expect("create venv");
                std::fs::write(bin.join("python"), "").expect("create interpreter");
                result(true, "")
            }
            _ => result(true, ""),
        }
    }

    fn checked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let r = self.respond(program, args);
        if r.success {
            Ok(r)
        } else {
            anyhow::bail!("{program} failed")
        }
    }
}

fn result(success: bool, stdout: &str) -> ExecResult {
    ExecResult {
        stdout: stdout.to_string(),
        stderr: String::new(),
        success,
        code: Some(i32::from(!success)),
    }
}

impl Executor for FakeHost {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_in(&self, _: &Path, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        _: &[(&str, &str)],
    ) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.respond(program, args))
    }

    fn which(&self, program: &str) -> bool {
        program == "raspi-config"
    }
}

/// An isolated device: a temp directory standing in for `/`, a fake host,
/// and a configuration pointing every path into the sandbox.
pub struct Device {
    /// Sandbox root.
    pub root: tempfile::TempDir,
    /// Simulated tools, shared with [`Device::host`].
    pub fake: Arc<FakeHost>,
    /// Configuration rooted in the sandbox.
    pub config: Config,
}

impl Device {
    /// A fresh device backed by [`FakeHost::new`].
    pub fn new() -> Self {
        Self::with_host(FakeHost::new())
    }

    /// A fresh device backed by `fake`.
    pub fn with_host(fake: FakeHost) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let r = root.path();
        let config = Config {
            install_dir: r.join("opt/blackbox"),
            identity_path: r.join("etc/blackbox/device.json"),
            unit_dir: r.join("etc/systemd/system"),
            sudoers_path: r.join("etc/sudoers.d/blackbox-power"),
            repo_url: Some(REPO_URL.to_string()),
            ..Config::default()
        };
        Self {
            root,
            fake: Arc::new(fake),
            config,
        }
    }

    /// Host handle for commands.
    pub fn host(&self) -> Host {
        Host {
            executor: Arc::clone(&self.fake) as Arc<dyn Executor>,
            sudo_user: None,
        }
    }

    /// A logger writing into the sandbox.
    pub fn logger(&self, command: &str) -> Arc<Logger> {
        Arc::new(Logger::in_dir(&self.root.path().join("log"), command))
    }

    /// Run `install` with the device configuration.
    pub fn install(&self) -> anyhow::Result<()> {
        blackbox_provision::commands::install::run(
            self.config.clone(),
            None,
            &self.host(),
            &self.logger("install"),
        )
    }

    /// Run `update` with the device configuration.
    pub fn update(&self) -> anyhow::Result<()> {
        blackbox_provision::commands::update::run(
            self.config.clone(),
            &self.host(),
            &self.logger("update"),
        )
    }

    /// Every regular file under the sandbox, excluding run logs.
    pub fn files(&self) -> Vec<PathBuf> {
        fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, out);
                } else {
                    out.push(path);
                }
            }
        }
        let mut out = Vec::new();
        walk(self.root.path(), &mut out);
        out.retain(|p| !p.starts_with(self.root.path().join("log")));
        out.sort();
        out
    }
}
