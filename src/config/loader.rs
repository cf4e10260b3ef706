// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HashgateError, Result};

/// Load a configuration file and return the unvalidated `RawConfigFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] for
/// range checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| HashgateError::from_io(path, e))?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// `Hashgate.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Hashgate.toml")
}

/// Pick the configuration for a run.
///
/// An explicit path must exist. Without one, `Hashgate.toml` is used if
/// present and built-in defaults otherwise.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let fallback = default_config_path();
    if fallback.is_file() {
        debug!(path = ?fallback, "loading default config");
        return load_and_validate(fallback);
    }

    debug!("no config file found; using defaults");
    Ok(ConfigFile::default())
}
