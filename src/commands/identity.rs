//! Command: print the stored device identity.
use anyhow::Result;

use crate::config::Config;
use crate::identity;

/// The identity file's record, re-serialized as JSON.
///
/// # Errors
///
/// Returns [`ConfigError::IdentityMissing`](crate::error::ConfigError::IdentityMissing)
/// when no identity has been created yet, or a parse error for a corrupt file.
pub fn render(config: &Config) -> Result<String> {
    let id = identity::load(&config.identity_path)?;
    id.to_json()
}

/// Print the identity to stdout.
///
/// # Errors
///
/// See [`render`].
#[allow(clippy::print_stdout)]
pub fn run(config: &Config) -> Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::identity::{DeviceIdentity, ensure};

    #[test]
    fn missing_identity_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            identity_path: tmp.path().join("device.json"),
            ..Config::default()
        };
        let err = render(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::IdentityMissing { .. })
        ));
    }

    #[test]
    fn renders_stored_identity() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            identity_path: tmp.path().join("device.json"),
            ..Config::default()
        };
        ensure(&config.identity_path).unwrap();
        let json = render(&config).unwrap();
        let parsed: DeviceIdentity = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_well_formed());
        let stored = std::fs::read_to_string(&config.identity_path).unwrap();
        assert_eq!(json, stored);
    }
}
