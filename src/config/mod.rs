//! Provisioner configuration: built-in defaults, optionally overridden by TOML.
pub mod toml_loader;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "BBX_PROVISION_CONFIG";

/// System-wide config file consulted when present.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/blackbox/provision.toml";

/// How `update` (and `install` over an existing checkout) moves the
/// checkout to the remote head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    /// `git merge --ff-only`; diverged local history aborts the run.
    #[default]
    FastForward,
    /// `git reset --hard`; local modifications are discarded.
    HardReset,
}

impl std::fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FastForward => write!(f, "fast-forward"),
            Self::HardReset => write!(f, "hard-reset"),
        }
    }
}

/// Every tunable of the provisioning pipeline.
///
/// All fields are optional in the TOML file; missing ones take the values
/// from [`Config::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of the application checkout.
    pub install_dir: PathBuf,
    /// Repository to clone when `install_dir` is not yet a checkout.
    pub repo_url: Option<String>,
    /// Branch tracked by the checkout.
    pub branch: String,
    /// Update policy for an existing checkout.
    pub sync_policy: SyncPolicy,
    /// First-choice runtime account.
    pub preferred_user: String,
    /// Second-choice runtime account.
    pub fallback_user: String,
    /// Location of the device identity JSON file.
    pub identity_path: PathBuf,
    /// Virtual environment directory; defaults to `<install_dir>/.venv`.
    pub venv_dir: Option<PathBuf>,
    /// Dependency manifest, relative to `install_dir`.
    pub requirements: PathBuf,
    /// systemd service name (without `.service`).
    pub service_name: String,
    /// Application entry script, relative to `install_dir`.
    pub entry: PathBuf,
    /// Value of `GPIOZERO_PIN_FACTORY` in the service environment.
    pub pin_factory: String,
    /// Directory the unit file is written to.
    pub unit_dir: PathBuf,
    /// Sudoers fragment granting reboot/poweroff.
    pub sudoers_path: PathBuf,
    /// OS packages that must be installed.
    pub packages: Vec<String>,
    /// Groups the runtime user joins for hardware access (when they exist).
    pub hardware_groups: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from("/opt/blackbox"),
            repo_url: None,
            branch: "main".to_string(),
            sync_policy: SyncPolicy::default(),
            preferred_user: "blackbox".to_string(),
            fallback_user: "pi".to_string(),
            identity_path: PathBuf::from("/etc/blackbox/device.json"),
            venv_dir: None,
            requirements: PathBuf::from("requirements.txt"),
            service_name: "blackbox".to_string(),
            entry: PathBuf::from("OLED/app.py"),
            pin_factory: "lgpio".to_string(),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            sudoers_path: PathBuf::from("/etc/sudoers.d/blackbox-power"),
            packages: [
                "git",
                "python3",
                "python3-venv",
                "python3-pip",
                "python3-dev",
                "python3-lgpio",
                "i2c-tools",
                "libjpeg-dev",
                "zlib1g-dev",
                "libfreetype6-dev",
                "alsa-utils",
                "bluez",
            ]
            .map(String::from)
            .to_vec(),
            hardware_groups: ["i2c", "gpio", "audio"].map(String::from).to_vec(),
        }
    }
}

impl Config {
    /// Load configuration following the search order: `explicit` path (must
    /// exist), `$BBX_PROVISION_CONFIG`, [`SYSTEM_CONFIG_PATH`] when present,
    /// otherwise built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the chosen file cannot be read, parsed, or
    /// fails validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let system = Path::new(SYSTEM_CONFIG_PATH);
        resolve_path(explicit, env.as_deref(), system)
            .map_or_else(|| Ok(Self::default()), |path| Self::load_file(&path))
    }

    /// Load and validate a specific config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// fails validation.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml_loader::load_config(path)?;
        config.validate().map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })?;
        Ok(config)
    }

    /// Check cross-field invariants, returning a description of the first
    /// violation.
    ///
    /// # Errors
    ///
    /// Returns the violation message.
    pub fn validate(&self) -> Result<(), String> {
        for (name, path) in [
            ("install_dir", &self.install_dir),
            ("identity_path", &self.identity_path),
            ("unit_dir", &self.unit_dir),
            ("sudoers_path", &self.sudoers_path),
        ] {
            if !path.is_absolute() {
                return Err(format!("{name} must be an absolute path"));
            }
        }
        if let Some(venv) = &self.venv_dir
            && !venv.is_absolute()
        {
            return Err("venv_dir must be an absolute path".to_string());
        }
        if self.entry.is_absolute() || self.requirements.is_absolute() {
            return Err("entry and requirements are relative to install_dir".to_string());
        }
        if self.service_name.is_empty() || self.service_name.contains('/') {
            return Err(format!("invalid service_name '{}'", self.service_name));
        }
        if self.preferred_user.is_empty() || self.fallback_user.is_empty() {
            return Err("preferred_user and fallback_user must not be empty".to_string());
        }
        if self.branch.is_empty() {
            return Err("branch must not be empty".to_string());
        }
        Ok(())
    }

    /// Virtual environment directory.
    #[must_use]
    pub fn venv_dir(&self) -> PathBuf {
        self.venv_dir
            .clone()
            .unwrap_or_else(|| self.install_dir.join(".venv"))
    }

    /// Interpreter inside the virtual environment.
    #[must_use]
    pub fn venv_python(&self) -> PathBuf {
        self.venv_dir().join("bin").join("python")
    }

    /// Absolute path of the dependency manifest.
    #[must_use]
    pub fn requirements_path(&self) -> PathBuf {
        self.install_dir.join(&self.requirements)
    }

    /// Absolute path of the application entry script.
    #[must_use]
    pub fn entry_path(&self) -> PathBuf {
        self.install_dir.join(&self.entry)
    }

    /// Full unit file name, e.g. `blackbox.service`.
    #[must_use]
    pub fn unit_name(&self) -> String {
        format!("{}.service", self.service_name)
    }

    /// Absolute path of the generated unit file.
    #[must_use]
    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(self.unit_name())
    }
}

/// Pick the config file to load, or `None` to use defaults.
#[must_use]
pub fn resolve_path(explicit: Option<&Path>, env: Option<&Path>, system: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path.to_path_buf());
    }
    system.is_file().then(|| system.to_path_buf())
}
