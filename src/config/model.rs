// src/config/model.rs

use serde::Deserialize;

use crate::detect::engine::{DEFAULT_MAX_CONCURRENCY, DetectorOptions};
use crate::detect::hash::DEFAULT_CHUNK_SIZE;

/// Configuration exactly as deserialized, before validation.
///
/// ```toml
/// [detector]
/// chunk_size = 8192
/// max_concurrency = 16
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub detector: DetectorSection,
}

/// `[detector]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorSection {
    /// Bytes read per chunk while hashing.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// How many files a batch check may work on at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for DetectorSection {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub detector: DetectorSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(detector: DetectorSection) -> Self {
        Self { detector }
    }

    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            chunk_size: self.detector.chunk_size,
            max_concurrency: self.detector.max_concurrency,
        }
    }
}
