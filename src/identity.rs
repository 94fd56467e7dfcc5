//! Persistent device identity.
//!
//! The identity file is written exactly once per device and is read-only
//! afterwards. [`ensure`] stages the record in a sibling file, syncs it, and
//! publishes it with a hard link, so the identity path only ever holds a
//! complete record and a concurrent run cannot overwrite one. A file left
//! empty or truncated by an older interrupted write is replaced.
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Prefix shared by every device id.
pub const DEVICE_ID_PREFIX: &str = "bbx-";

/// Number of hex characters taken from the random UUID.
pub const DEVICE_ID_HEX_LEN: usize = 12;

/// The record distinguishing one physical device from another in a fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// `bbx-` followed by 12 lowercase hex characters.
    pub device_id: String,
    /// Creation time, UTC, second precision.
    pub created_utc: DateTime<Utc>,
}

impl DeviceIdentity {
    /// Generate a fresh identity from a random v4 UUID.
    #[must_use]
    pub fn generate() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        let suffix: String = hex.chars().take(DEVICE_ID_HEX_LEN).collect();
        Self {
            device_id: format!("{DEVICE_ID_PREFIX}{suffix}"),
            created_utc: Utc::now().trunc_subsecs(0),
        }
    }

    /// Whether `device_id` has the expected shape.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.device_id
            .strip_prefix(DEVICE_ID_PREFIX)
            .is_some_and(|hex| hex.len() == DEVICE_ID_HEX_LEN && is_lower_hex(hex))
    }

    /// Pretty JSON form, as written to disk (with trailing newline).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(self).context("serializing device identity")?;
        json.push('\n');
        Ok(json)
    }
}

fn is_lower_hex(s: &str) -> bool {
    s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

/// Read the identity stored at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::IdentityMissing`] when the file does not exist,
/// [`ConfigError::Io`] when it cannot be read,
/// [`ConfigError::IdentityIncomplete`] when it is empty or truncated, and
/// [`ConfigError::InvalidIdentity`] when it does not parse.
pub fn load(path: &Path) -> Result<DeviceIdentity, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::IdentityMissing {
                path: path.display().to_string(),
            }
        } else {
            ConfigError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })?;
    serde_json::from_str(&content).map_err(|e| {
        if e.is_eof() {
            ConfigError::IdentityIncomplete {
                path: path.display().to_string(),
            }
        } else {
            ConfigError::InvalidIdentity {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        }
    })
}

/// Outcome of [`ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ensured {
    /// A new identity was written.
    Created(DeviceIdentity),
    /// An empty or truncated file was replaced with a new identity.
    Repaired(DeviceIdentity),
    /// A valid identity already existed and was left untouched.
    Existing(DeviceIdentity),
    /// A complete file exists but is not an identity; it was left untouched.
    Unreadable(String),
}

/// Create the identity file at `path` unless a complete one already exists.
///
/// Parent directories are created as needed. A well-formed JSON document is
/// never rewritten, even if it is not a valid identity.
///
/// # Errors
///
/// Returns an error if the file cannot be read or created.
pub fn ensure(path: &Path) -> Result<Ensured> {
    match load(path) {
        Ok(identity) => Ok(Ensured::Existing(identity)),
        Err(ConfigError::InvalidIdentity { message, .. }) => Ok(Ensured::Unreadable(message)),
        Err(ConfigError::IdentityMissing { .. }) => {
            let identity = DeviceIdentity::generate();
            publish(path, &identity, Publish::Exclusive)?;
            Ok(Ensured::Created(identity))
        }
        Err(ConfigError::IdentityIncomplete { .. }) => {
            let identity = DeviceIdentity::generate();
            publish(path, &identity, Publish::Replace)?;
            Ok(Ensured::Repaired(identity))
        }
        Err(e) => Err(e.into()),
    }
}

/// How a staged record takes the identity path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Publish {
    /// Hard link; fails with `AlreadyExists` if the path is taken.
    Exclusive,
    /// Rename over an incomplete file.
    Replace,
}

/// Sibling path the record is staged in before publishing.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

/// Write `identity` to a staged file, sync it, then move it to `path`.
fn publish(path: &Path, identity: &DeviceIdentity, mode: Publish) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let json = identity.to_json()?;
    let staged = staging_path(path);

    let write = || -> Result<()> {
        let mut file = fs::File::create(&staged)
            .with_context(|| format!("creating {}", staged.display()))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .with_context(|| format!("writing {}", staged.display()))?;
        let published = match mode {
            Publish::Exclusive => fs::hard_link(&staged, path),
            Publish::Replace => fs::rename(&staged, path),
        };
        published.with_context(|| format!("publishing {}", path.display()))
    };

    let result = write();
    if staged.exists() {
        fs::remove_file(&staged).ok();
    }
    result
}
