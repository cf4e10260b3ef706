// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HashgateError, Result};

/// Largest accepted `chunk_size` (64 MiB).
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = HashgateError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.detector))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_chunk_size(cfg)?;
    validate_concurrency(cfg)?;
    Ok(())
}

fn validate_chunk_size(cfg: &RawConfigFile) -> Result<()> {
    let size = cfg.detector.chunk_size;
    if size == 0 || size > MAX_CHUNK_SIZE {
        return Err(HashgateError::ConfigError(format!(
            "[detector].chunk_size must be between 1 and {MAX_CHUNK_SIZE} (got {size})"
        )));
    }
    Ok(())
}

fn validate_concurrency(cfg: &RawConfigFile) -> Result<()> {
    if cfg.detector.max_concurrency == 0 {
        return Err(HashgateError::ConfigError(
            "[detector].max_concurrency must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
