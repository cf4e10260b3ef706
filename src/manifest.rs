// src/manifest.rs

//! Known-metadata manifests.
//!
//! A manifest records what a previous run saw for each file, so a later
//! `check` can compare against it:
//!
//! ```toml
//! [[file]]
//! path = "src/lib.rs"
//! hash = "9F86D081884C7D659A2FEAA0C55AD015"
//! modified_unix_nanos = 1700000000123456789
//! ```
//!
//! Both `hash` and `modified_unix_nanos` are optional per entry.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::errors::{HashgateError, Result};
use crate::types::{FileMetadata, KnownMetadata};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "file", default)]
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_unix_nanos: Option<i64>,
}

impl Manifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| HashgateError::from_io(path, e))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Build a manifest from snapshots, sorted by path.
    pub fn from_snapshots<'a>(snapshots: impl IntoIterator<Item = &'a FileMetadata>) -> Result<Self> {
        let mut files = snapshots
            .into_iter()
            .map(|m| -> Result<ManifestEntry> {
                let nanos = system_time_to_nanos(m.last_modified()).ok_or_else(|| {
                    HashgateError::ManifestError(format!(
                        "modification time of {:?} does not fit in i64 nanoseconds",
                        m.path()
                    ))
                })?;
                Ok(ManifestEntry {
                    path: m.path().to_path_buf(),
                    hash: Some(m.hash().to_string()),
                    modified_unix_nanos: Some(nanos),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(Self { files })
    }

    /// Index entries by path for a batch check.
    ///
    /// Duplicate paths are rejected rather than silently resolved.
    pub fn into_known_map(self) -> Result<HashMap<PathBuf, KnownMetadata>> {
        let mut map = HashMap::with_capacity(self.files.len());
        for entry in self.files {
            let modified = entry
                .modified_unix_nanos
                .map(|n| {
                    nanos_to_system_time(n).ok_or_else(|| {
                        HashgateError::ManifestError(format!(
                            "modified_unix_nanos out of range for {:?}: {n}",
                            entry.path
                        ))
                    })
                })
                .transpose()?;
            let known = KnownMetadata::new(entry.hash, modified);
            if map.insert(entry.path.clone(), known).is_some() {
                return Err(HashgateError::ManifestError(format!(
                    "duplicate manifest entry for {:?}",
                    entry.path
                )));
            }
        }
        Ok(map)
    }
}

/// Signed nanoseconds since the Unix epoch, if representable.
pub fn system_time_to_nanos(t: SystemTime) -> Option<i64> {
    match t.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).ok(),
        Err(before) => i64::try_from(before.duration().as_nanos())
            .ok()
            .map(|n| -n),
    }
}

pub fn nanos_to_system_time(nanos: i64) -> Option<SystemTime> {
    let magnitude = Duration::from_nanos(nanos.unsigned_abs());
    if nanos >= 0 {
        UNIX_EPOCH.checked_add(magnitude)
    } else {
        UNIX_EPOCH.checked_sub(magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_with_optional_fields() {
        let manifest = Manifest::from_toml_str(
            r#"
[[file]]
path = "a.txt"
hash = "ABCD"
modified_unix_nanos = 1500

[[file]]
path = "b.txt"
"#,
        )
        .unwrap();

        let known = manifest.into_known_map().unwrap();
        let a = &known[&PathBuf::from("a.txt")];
        assert_eq!(a.hash.as_deref(), Some("ABCD"));
        assert_eq!(a.modified, Some(UNIX_EPOCH + Duration::from_nanos(1500)));
        assert_eq!(known[&PathBuf::from("b.txt")], KnownMetadata::default());
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let manifest = Manifest::from_toml_str(
            r#"
[[file]]
path = "a.txt"

[[file]]
path = "a.txt"
hash = "00"
"#,
        )
        .unwrap();
        let err = manifest.into_known_map().unwrap_err();
        assert!(matches!(err, HashgateError::ManifestError(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn empty_document_is_an_empty_manifest() {
        let manifest = Manifest::from_toml_str("").unwrap();
        assert!(manifest.files.is_empty());
    }

    #[test]
    fn snapshots_serialize_sorted_and_reload() {
        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 42);
        let snaps = vec![
            FileMetadata::new("z", 1, t, "AA", SystemTime::now()),
            FileMetadata::new("m", 2, t, "BB", SystemTime::now()),
        ];
        let manifest = Manifest::from_snapshots(&snaps).unwrap();
        assert_eq!(manifest.files[0].path, PathBuf::from("m"));

        let text = manifest.to_toml_string().unwrap();
        let reloaded = Manifest::from_toml_str(&text).unwrap();
        assert_eq!(reloaded, manifest);

        let known = reloaded.into_known_map().unwrap();
        assert_eq!(known[&PathBuf::from("z")].modified, Some(t));
    }

    #[test]
    fn pre_epoch_times_convert_both_ways() {
        let t = UNIX_EPOCH - Duration::from_secs(5);
        let n = system_time_to_nanos(t).unwrap();
        assert_eq!(n, -5_000_000_000);
        assert_eq!(nanos_to_system_time(n), Some(t));
    }
}
