use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Size and modification time reported by a single stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub len: u64,
    pub modified: SystemTime,
}

/// Snapshot of a file's identity signals at one point in time.
///
/// Records are never mutated after construction; the cache replaces whole
/// entries, so a reader either sees the previous snapshot or the new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    path: PathBuf,
    size: u64,
    last_modified: SystemTime,
    hash: String,
    last_checked: SystemTime,
}

impl FileMetadata {
    pub fn new(
        path: impl Into<PathBuf>,
        size: u64,
        last_modified: SystemTime,
        hash: impl Into<String>,
        last_checked: SystemTime,
    ) -> Self {
        Self {
            path: path.into(),
            size,
            last_modified,
            hash: hash.into(),
            last_checked,
        }
    }

    /// Build a freshly checked snapshot from a stat result and a digest.
    pub fn observed(path: impl Into<PathBuf>, stat: FileStat, hash: impl Into<String>) -> Self {
        Self::new(path, stat.len, stat.modified, hash, SystemTime::now())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn last_checked(&self) -> SystemTime {
        self.last_checked
    }

    /// True when the snapshot's size and modification time agree with `stat`.
    pub fn matches_stat(&self, stat: &FileStat) -> bool {
        self.size == stat.len && self.last_modified == stat.modified
    }
}

/// What a caller remembers about a file from a previous run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownMetadata {
    pub hash: Option<String>,
    pub modified: Option<SystemTime>,
}

impl KnownMetadata {
    pub fn new(hash: Option<String>, modified: Option<SystemTime>) -> Self {
        Self { hash, modified }
    }
}

/// Entry count and summed sizes of the metadata cache, read in one critical
/// section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub count: usize,
    pub total_bytes: u64,
}

/// The detection stage that settled a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeReason {
    /// Nothing exists at the path.
    Missing,
    /// The caller's modification time differs from the filesystem's.
    ModifiedTimeDiffers,
    /// A cached snapshot exists but no longer matches the file's size/mtime.
    CacheStale,
    /// A cached snapshot matches the file and the caller's hash.
    CacheHit,
    /// A freshly computed hash differs from the caller's hash.
    HashDiffers,
    /// A freshly computed hash equals the caller's hash.
    HashMatches,
    /// The caller supplied no usable hash to compare against.
    NoBaseline,
    /// A filesystem operation failed; the file is assumed changed.
    IoFailure,
}

impl ChangeReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeReason::Missing => "missing",
            ChangeReason::ModifiedTimeDiffers => "mtime-differs",
            ChangeReason::CacheStale => "cache-stale",
            ChangeReason::CacheHit => "cache-hit",
            ChangeReason::HashDiffers => "hash-differs",
            ChangeReason::HashMatches => "hash-matches",
            ChangeReason::NoBaseline => "no-baseline",
            ChangeReason::IoFailure => "io-failure",
        }
    }
}

/// Outcome of a single staged check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub changed: bool,
    pub reason: ChangeReason,
}

impl Verdict {
    pub fn changed(reason: ChangeReason) -> Self {
        Self {
            changed: true,
            reason,
        }
    }

    pub fn unchanged(reason: ChangeReason) -> Self {
        Self {
            changed: false,
            reason,
        }
    }
}
