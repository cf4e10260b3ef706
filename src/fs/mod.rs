// src/fs/mod.rs

//! Filesystem read capability consumed by the detector.
//!
//! The detector only ever opens files for reading and stats them, so that is
//! all this trait exposes. Errors stay as `std::io::Error` so callers can
//! tell a missing file apart from any other failure.

use std::fmt::Debug;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::types::FileStat;

pub mod mock;

/// Rebuild `path` from its components.
///
/// Spellings that `Path` considers equal (`f` and `f/`, `a//b` and `a/b`,
/// `a/./b` and `a/b`) all come out identical, so a path is checked, cached
/// and reported under one spelling no matter how the caller wrote it.
pub fn normalize_spelling(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Open a regular file for streaming reads.
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Stat a regular file. Missing paths fail with `ErrorKind::NotFound`.
    fn metadata(&self, path: &Path) -> io::Result<FileStat>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path)?;
        Ok(Box::new(file))
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        Ok(FileStat {
            len: meta.len(),
            modified: meta.modified()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_paths_share_one_spelling() {
        for (input, expected) in [
            ("f/", "f"),
            ("a//b", "a/b"),
            ("a/./b/", "a/b"),
            ("/tmp//x", "/tmp/x"),
            ("./a", "./a"),
        ] {
            let normalized = normalize_spelling(Path::new(input));
            assert_eq!(normalized.as_os_str(), expected, "input {input:?}");
        }
    }
}
