//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use crate::resources::ResourceState;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Compare the file at `path` with the desired `contents` and permission `mode`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn file_state(path: &Path, contents: &str, mode: u32) -> Result<ResourceState> {
    let current = match std::fs::read_to_string(path) {
        Ok(current) => current,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ResourceState::Missing),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    if current != contents {
        return Ok(ResourceState::Incorrect {
            current: "contents differ".to_string(),
        });
    }
    let current_mode = std::fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .permissions()
        .mode()
        & 0o7777;
    if current_mode == mode {
        Ok(ResourceState::Correct)
    } else {
        Ok(ResourceState::Incorrect {
            current: format!("mode {current_mode:o}"),
        })
    }
}

/// Sibling path used to stage a write of `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".bbx-new");
    path.with_file_name(name)
}

/// Write `contents` to `path` with permission `mode`, replacing any existing
/// file atomically.
///
/// The data is staged to a sibling file, chmodded, passed to `validate`, and
/// only then renamed over `path`. If `validate` fails the staged file is
/// removed and `path` is left as it was.
///
/// # Errors
///
/// Returns an error if the file cannot be written, `validate` rejects it, or
/// the rename fails.
pub fn replace_file(
    path: &Path,
    contents: &str,
    mode: u32,
    validate: impl FnOnce(&Path) -> Result<()>,
) -> Result<()> {
    ensure_parent_dir(path)?;
    let staged = staging_path(path);
    std::fs::write(&staged, contents).with_context(|| format!("writing {}", staged.display()))?;

    let finish = || -> Result<()> {
        std::fs::set_permissions(&staged, std::fs::Permissions::from_mode(mode))
            .with_context(|| format!("chmod {mode:o} {}", staged.display()))?;
        validate(&staged)?;
        std::fs::rename(&staged, path)
            .with_context(|| format!("renaming {} to {}", staged.display(), path.display()))
    };

    finish().inspect_err(|_| {
        std::fs::remove_file(&staged).ok();
    })
}
