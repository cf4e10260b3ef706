// src/detect/cache.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::types::{CacheStats, FileMetadata};

/// In-memory map from path to the last observed snapshot.
///
/// Every operation takes the lock exactly once and never holds it across
/// I/O. Entries are immutable `Arc<FileMetadata>` values that are replaced
/// wholesale, so a poisoned lock still guards a consistent map and is simply
/// recovered.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: Mutex<HashMap<PathBuf, Arc<FileMetadata>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<FileMetadata>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, path: &Path) -> Option<Arc<FileMetadata>> {
        self.lock().get(path).cloned()
    }

    /// Replace the entry for `path`.
    pub fn set(&self, path: &Path, metadata: FileMetadata) {
        let entry = Arc::new(metadata);
        let previous = self.lock().insert(path.to_path_buf(), entry);
        if previous.is_some() {
            debug!(?path, "replaced cached snapshot");
        }
    }

    pub fn clear(&self) {
        let removed = {
            let mut entries = self.lock();
            let n = entries.len();
            entries.clear();
            n
        };
        debug!(removed, "cleared metadata cache");
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        CacheStats {
            count: entries.len(),
            total_bytes: entries.values().map(|m| m.size()).sum(),
        }
    }
}
