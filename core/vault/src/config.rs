//! Tool configuration.
//!
//! Settings are resolved from built-in defaults, then an optional JSON file
//! in the user's configuration directory, then environment variables. The
//! CLI applies its own flags last.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use jsonvault_common::{Error, Result};
use jsonvault_crypto::KeyStore;

/// Application directory name under system config/data directories.
pub const APP_DIRNAME: &str = "jsonvault";

/// Configuration file name.
pub const CONFIG_FILENAME: &str = "config.json";

/// Key store directory name.
pub const KEYS_DIRNAME: &str = "keys";

/// Overrides the machine-wide key store directory.
pub const ENV_MACHINE_STORE: &str = "JSONVAULT_MACHINE_STORE";

/// Overrides the per-user key store directory.
pub const ENV_USER_STORE: &str = "JSONVAULT_USER_STORE";

/// Overrides the directory vault files are written to.
pub const ENV_OUTPUT_DIR: &str = "JSONVAULT_OUTPUT_DIR";

/// Resolved tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Directory of the machine-wide key store.
    pub machine_store_dir: PathBuf,
    /// Directory of the current user's key store.
    pub user_store_dir: PathBuf,
    /// Directory vault files are written to.
    pub output_dir: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            machine_store_dir: default_machine_store(),
            user_store_dir: default_user_store(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ToolConfig {
    /// Location of the configuration file, if the platform has one.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIRNAME).join(CONFIG_FILENAME))
    }

    /// Resolve settings from defaults, the configuration file and the
    /// process environment.
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_config_path() {
            Some(path) if path.is_file() => Self::load_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read settings from a JSON file; missing fields keep their defaults.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_json(&text)
    }

    /// Deserialize settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Serialize settings to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Apply overrides from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        if let Some(dir) = get(ENV_MACHINE_STORE) {
            self.machine_store_dir = dir;
        }
        if let Some(dir) = get(ENV_USER_STORE) {
            self.user_store_dir = dir;
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.output_dir = dir;
        }
    }

    /// Key store over the configured directories.
    pub fn key_store(&self) -> KeyStore {
        KeyStore::new(&self.machine_store_dir, &self.user_store_dir)
    }
}

#[cfg(windows)]
fn default_machine_store() -> PathBuf {
    std::env::var_os("ProgramData")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"))
        .join(APP_DIRNAME)
        .join(KEYS_DIRNAME)
}

#[cfg(not(windows))]
fn default_machine_store() -> PathBuf {
    PathBuf::from("/etc").join(APP_DIRNAME).join(KEYS_DIRNAME)
}

fn default_user_store() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIRNAME)
        .join(KEYS_DIRNAME)
}
