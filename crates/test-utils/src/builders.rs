#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use hashgate::KnownMetadata;

/// Builder for the per-path known-metadata map passed to `batch_check`.
pub struct KnownMetadataBuilder {
    map: HashMap<PathBuf, KnownMetadata>,
}

impl KnownMetadataBuilder {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn with_hash(mut self, path: impl Into<PathBuf>, hash: &str) -> Self {
        self.entry(path).hash = Some(hash.to_string());
        self
    }

    pub fn with_modified(mut self, path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        self.entry(path).modified = Some(modified);
        self
    }

    pub fn with_snapshot(
        self,
        path: impl Into<PathBuf>,
        hash: &str,
        modified: SystemTime,
    ) -> Self {
        let path = path.into();
        self.with_hash(path.clone(), hash).with_modified(path, modified)
    }

    fn entry(&mut self, path: impl Into<PathBuf>) -> &mut KnownMetadata {
        self.map.entry(path.into()).or_default()
    }

    pub fn build(self) -> HashMap<PathBuf, KnownMetadata> {
        self.map
    }
}

impl Default for KnownMetadataBuilder {
    fn default() -> Self {
        Self::new()
    }
}
