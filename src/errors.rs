// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HashgateError {
    #[error("File not found: {0:?}")]
    NotFound(PathBuf),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HashgateError {
    /// Wrap an I/O error for `path`, folding `NotFound` into its own variant.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            HashgateError::NotFound(path)
        } else {
            HashgateError::Io { path, source }
        }
    }

    /// The underlying I/O error kind, if this is a filesystem failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            HashgateError::NotFound(_) => Some(io::ErrorKind::NotFound),
            HashgateError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HashgateError>;
