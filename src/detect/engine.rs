// src/detect/engine.rs

//! Staged change detection for a single file.
//!
//! Checks run from cheapest to most expensive and stop at the first
//! conclusive answer:
//!
//! 1. existence (one stat call, reused by every later stage)
//! 2. caller's modification time
//! 3. cached snapshot
//! 4. content hash, which refreshes the cache
//! 5. no baseline to compare against
//!
//! Anything that cannot be verified is reported as changed.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use crate::detect::cache::MetadataCache;
use crate::detect::hash::{
    compute_file_hash_chunked, digests_equal, normalize_known_hash, DEFAULT_CHUNK_SIZE,
};
use crate::detect::sink::{Diagnostic, DiagnosticLevel, DiagnosticSink, NoopSink, Stage};
use crate::errors::{HashgateError, Result};
use crate::fs::{normalize_spelling, FileSystem};
use crate::types::{CacheStats, ChangeReason, FileMetadata, Verdict};

/// Tunables for a detector, usually taken from the `[detector]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorOptions {
    /// Bytes read per chunk while hashing.
    pub chunk_size: usize,
    /// Upper bound on batch checks in flight at once.
    pub max_concurrency: usize,
}

pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Decision engine plus the metadata cache it owns.
///
/// Clones share the same cache, filesystem and sink.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    fs: Arc<dyn FileSystem>,
    cache: Arc<MetadataCache>,
    sink: Arc<dyn DiagnosticSink>,
    options: DetectorOptions,
}

impl ChangeDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_options(fs, DetectorOptions::default())
    }

    pub fn with_options(fs: Arc<dyn FileSystem>, options: DetectorOptions) -> Self {
        Self {
            fs,
            cache: Arc::new(MetadataCache::new()),
            sink: Arc::new(NoopSink),
            options,
        }
    }

    /// Replace the diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> DetectorOptions {
        self.options
    }

    /// Whether `path` must be treated as changed relative to the caller's
    /// snapshot. Never fails: unverifiable files count as changed.
    pub fn has_changed(
        &self,
        path: &Path,
        known_hash: Option<&str>,
        known_modified: Option<SystemTime>,
    ) -> bool {
        self.check(path, known_hash, known_modified).changed
    }

    /// Like [`has_changed`](Self::has_changed), but also reports which stage
    /// decided.
    ///
    /// `path` is checked under its normalized spelling, so `f` and `f/` give
    /// the same verdict and share one cache entry.
    pub fn check(
        &self,
        path: &Path,
        known_hash: Option<&str>,
        known_modified: Option<SystemTime>,
    ) -> Verdict {
        let path = normalize_spelling(path);
        let known_hash = normalize_known_hash(known_hash);
        let verdict = self.run_stages(&path, known_hash, known_modified);
        self.emit(
            DiagnosticLevel::Debug,
            Stage::Verdict,
            &path,
            format!(
                "{} ({})",
                if verdict.changed { "changed" } else { "unchanged" },
                verdict.reason.as_str()
            ),
        );
        verdict
    }

    fn run_stages(
        &self,
        path: &Path,
        known_hash: Option<&str>,
        known_modified: Option<SystemTime>,
    ) -> Verdict {
        // 1) Existence. The same stat feeds the mtime and cache stages.
        let stat = match self.fs.metadata(path) {
            Ok(stat) => stat,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Verdict::changed(ChangeReason::Missing);
            }
            Err(err) => {
                self.emit_failure(Stage::Existence, path, &err);
                return Verdict::changed(ChangeReason::IoFailure);
            }
        };

        // 2) Modification time.
        if let Some(known) = known_modified {
            if known != stat.modified {
                self.emit(
                    DiagnosticLevel::Debug,
                    Stage::ModifiedTime,
                    path,
                    "modification time differs from caller's; skipping hash".to_string(),
                );
                return Verdict::changed(ChangeReason::ModifiedTimeDiffers);
            }
        }

        // 3) Cache. A snapshot that disagrees with disk is not trusted.
        if let Some(cached) = self.cache.get(path) {
            if !cached.matches_stat(&stat) {
                self.emit(
                    DiagnosticLevel::Debug,
                    Stage::Cache,
                    path,
                    "cached snapshot disagrees with size/mtime on disk".to_string(),
                );
                return Verdict::changed(ChangeReason::CacheStale);
            }
            if let Some(known) = known_hash {
                if digests_equal(cached.hash(), known) {
                    self.emit(
                        DiagnosticLevel::Debug,
                        Stage::Cache,
                        path,
                        "cached hash matches caller's".to_string(),
                    );
                    return Verdict::unchanged(ChangeReason::CacheHit);
                }
            }
        }

        // 4) Hash and refresh the cache.
        if let Some(known) = known_hash {
            let current =
                match compute_file_hash_chunked(self.fs.as_ref(), path, self.options.chunk_size) {
                    Ok(hash) => hash,
                    Err(err) => {
                        self.emit_failure(Stage::Hash, path, &err);
                        return Verdict::changed(ChangeReason::IoFailure);
                    }
                };
            let equal = digests_equal(&current, known);
            self.cache
                .set(path, FileMetadata::observed(path, stat, current));

            return if equal {
                Verdict::unchanged(ChangeReason::HashMatches)
            } else {
                Verdict::changed(ChangeReason::HashDiffers)
            };
        }

        // 5) Nothing to compare against.
        Verdict::changed(ChangeReason::NoBaseline)
    }

    /// Stat and hash `path`, record the result in the cache and return it.
    pub fn snapshot(&self, path: &Path) -> Result<FileMetadata> {
        let normalized = normalize_spelling(path);
        let path = normalized.as_path();
        let stat = self
            .fs
            .metadata(path)
            .map_err(|e| HashgateError::from_io(path, e))?;
        let hash = compute_file_hash_chunked(self.fs.as_ref(), path, self.options.chunk_size)?;
        let metadata = FileMetadata::observed(path, stat, hash);
        self.cache.set(path, metadata.clone());
        Ok(metadata)
    }

    /// Content digest of `path`. Also refreshes the cached snapshot.
    pub fn compute_hash(&self, path: &Path) -> Result<String> {
        self.snapshot(path).map(|m| m.hash().to_string())
    }

    /// The cached snapshot for `path`, if any.
    pub fn cached(&self, path: &Path) -> Option<FileMetadata> {
        self.cache
            .get(&normalize_spelling(path))
            .map(|m| m.as_ref().clone())
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn emit_failure(&self, stage: Stage, path: &Path, err: &dyn std::fmt::Display) {
        self.emit(
            DiagnosticLevel::Warn,
            stage,
            path,
            format!("check failed, assuming changed: {err}"),
        );
    }

    fn emit(&self, level: DiagnosticLevel, stage: Stage, path: &Path, message: String) {
        self.sink.emit(&Diagnostic {
            level,
            stage,
            path: path.to_path_buf(),
            message,
        });
    }
}
