//! Credential storage backed by a small YAML file.

use crate::error::JdError::Config;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "JD_CONFIG";
/// File name used inside the per-user configuration directory
pub const CONFIG_FILE_NAME: &str = "jdconfig.yaml";

const LOGIN_HINT: &str = "Use 'jdcli login' to populate them";

/// Credentials persisted between invocations
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    #[serde(default)]
    pub mail: String,
    #[serde(default)]
    pub password: String,
    /// Preferred device, used when `--device` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

/// Resolves the config file path from the `JD_CONFIG` override or the user config directory
///
/// # Errors
///
/// Returns an error if neither the override is set nor a config directory can be determined
pub fn resolve_config_path() -> Result<PathBuf> {
    resolve_config_path_from(env::var_os(CONFIG_ENV), dirs::config_dir())
}

fn resolve_config_path_from(
    env_override: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = env_override {
        return Ok(PathBuf::from(path));
    }
    config_dir
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .ok_or_else(|| Config("unable to determine the user configuration directory".into()).into())
}

/// Loads and saves [`Credentials`] at a fixed path
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the path returned by [`resolve_config_path`]
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(resolve_config_path()?))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored credentials
    ///
    /// # Errors
    ///
    /// Returns [`Config`] if:
    /// - The file cannot be read or parsed
    /// - Email or password is empty
    pub fn load(&self) -> Result<Credentials> {
        debug!("Loading credentials from {}", self.path.display());
        let data = fs::read_to_string(&self.path).map_err(|e| {
            Config(format!(
                "unable to read {}: {e}. {LOGIN_HINT}",
                self.path.display()
            ))
        })?;
        let credentials: Credentials = serde_yaml::from_str(&data).map_err(|e| {
            Config(format!(
                "unable to parse {}: {e}. {LOGIN_HINT}",
                self.path.display()
            ))
        })?;

        if credentials.mail.is_empty() || credentials.password.is_empty() {
            return Err(Config(format!("credentials are not specified. {LOGIN_HINT}")).into());
        }
        Ok(credentials)
    }

    /// Writes the credentials, readable by the owner only
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or the file cannot be written
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let data = serde_yaml::to_string(credentials)
            .map_err(|e| Config(format!("unable to serialize credentials: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut file = open_private(&self.path)
            .map_err(|e| Config(format!("unable to write {}: {e}", self.path.display())))?;
        file.write_all(data.as_bytes())
            .map_err(|e| Config(format!("unable to write {}: {e}", self.path.display())))?;

        debug!("Credentials saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
