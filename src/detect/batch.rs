// src/detect/batch.rs

//! Concurrent batch driver.
//!
//! Each distinct path gets its own tokio task; the staged check itself is
//! blocking filesystem work and runs on the blocking pool. A semaphore caps
//! how many checks are in flight. Results are seeded with "changed" for every
//! path before any worker runs, so a worker that dies still leaves an answer.
//!
//! Paths are normalized before de-duplication (`f/` and `f` are one entry,
//! reported as `f`), the same spelling [`ChangeDetector::check`] uses.
//!
//! The semaphore is a throughput cap, not a fairness guarantee: a task waiting
//! for a permit sits behind whatever checks are already running, including
//! slow hashes of large files.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::detect::engine::ChangeDetector;
use crate::fs::normalize_spelling;
use crate::types::{ChangeReason, KnownMetadata, Verdict};

impl ChangeDetector {
    /// Check every distinct path concurrently.
    ///
    /// Produces the same `(path, changed)` pairs as calling
    /// [`has_changed`](ChangeDetector::has_changed) on each path in turn with
    /// the same known metadata.
    pub async fn batch_check<I, P>(
        &self,
        paths: I,
        known: Option<&HashMap<PathBuf, KnownMetadata>>,
    ) -> HashMap<PathBuf, bool>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.batch_check_verdicts(paths, known)
            .await
            .into_iter()
            .map(|(path, verdict)| (path, verdict.changed))
            .collect()
    }

    /// Like [`batch_check`](Self::batch_check), keeping the deciding stage.
    pub async fn batch_check_verdicts<I, P>(
        &self,
        paths: I,
        known: Option<&HashMap<PathBuf, KnownMetadata>>,
    ) -> HashMap<PathBuf, Verdict>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let distinct: HashSet<PathBuf> = paths
            .into_iter()
            .map(|p| {
                let p: PathBuf = p.into();
                normalize_spelling(&p)
            })
            .collect();

        let mut results: HashMap<PathBuf, Verdict> = distinct
            .iter()
            .map(|p| (p.clone(), Verdict::changed(ChangeReason::IoFailure)))
            .collect();

        let limit = Arc::new(Semaphore::new(self.options().max_concurrency.max(1)));
        let mut workers = JoinSet::new();

        for path in distinct {
            let entry = known
                .and_then(|m| m.get(&path))
                .cloned()
                .unwrap_or_default();
            let detector = self.clone();
            let limit = Arc::clone(&limit);

            workers.spawn(async move {
                // The semaphore is never closed, so this only fails if it is.
                let _permit = limit.acquire_owned().await.ok();
                let task_path = path.clone();
                let verdict = tokio::task::spawn_blocking(move || {
                    detector.check(&task_path, entry.hash.as_deref(), entry.modified)
                })
                .await
                .unwrap_or_else(|err| {
                    warn!(path = ?path, error = %err, "check panicked; assuming changed");
                    Verdict::changed(ChangeReason::IoFailure)
                });
                (path, verdict)
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((path, verdict)) => {
                    results.insert(path, verdict);
                }
                Err(err) => {
                    warn!(error = %err, "batch worker failed; its path stays marked changed");
                }
            }
        }

        let changed = results.values().filter(|v| v.changed).count();
        debug!(total = results.len(), changed, "batch check finished");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::hash::hash_bytes;
    use crate::detect::engine::DetectorOptions;
    use crate::fs::RealFileSystem;
    use crate::fs::mock::MockFileSystem;

    #[tokio::test]
    async fn duplicates_collapse_to_one_result() {
        let fs = MockFileSystem::new();
        fs.add_file("a", b"a".to_vec());
        let det = ChangeDetector::new(Arc::new(fs));

        let out = det.batch_check(["a", "a", "missing", "a"], None).await;
        assert_eq!(out.len(), 2);
        assert!(out[&PathBuf::from("a")]);
        assert!(out[&PathBuf::from("missing")]);
    }

    #[tokio::test]
    async fn spelling_variants_agree_with_sequential_checks() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("f");
        std::fs::write(&f, b"body").unwrap();
        let spellings = vec![
            f.clone(),
            PathBuf::from(format!("{}/", f.display())),
            PathBuf::from(format!("{}//f", dir.path().display())),
        ];

        let mut known = HashMap::new();
        known.insert(f.clone(), KnownMetadata::new(Some(hash_bytes(b"body")), None));

        let sequential = ChangeDetector::new(Arc::new(RealFileSystem));
        let expected: HashMap<PathBuf, bool> = spellings
            .iter()
            .map(|p| {
                let entry = &known[&f];
                let changed = sequential.has_changed(p, entry.hash.as_deref(), entry.modified);
                (normalize_spelling(p), changed)
            })
            .collect();

        let batch = ChangeDetector::new(Arc::new(RealFileSystem));
        let out = batch.batch_check(spellings, Some(&known)).await;

        assert_eq!(out, expected);
        assert_eq!(out.len(), 1);
        assert!(!out[&f]);
        assert_eq!(batch.cache_stats().count, 1);
    }

    #[tokio::test]
    async fn single_permit_still_checks_every_path() {
        let fs = MockFileSystem::new();
        let names: Vec<String> = (0..8).map(|i| format!("f{i}")).collect();
        for name in &names {
            fs.add_file(name, name.as_bytes().to_vec());
        }
        let known: HashMap<PathBuf, KnownMetadata> = names
            .iter()
            .map(|n| {
                (
                    PathBuf::from(n),
                    KnownMetadata::new(Some(hash_bytes(n.as_bytes())), None),
                )
            })
            .collect();
        let det = ChangeDetector::with_options(
            Arc::new(fs),
            DetectorOptions {
                max_concurrency: 1,
                ..DetectorOptions::default()
            },
        );

        let out = det.batch_check_verdicts(names.clone(), Some(&known)).await;
        assert_eq!(out.len(), names.len());
        for name in &names {
            assert_eq!(out[&PathBuf::from(name)], Verdict::unchanged(ChangeReason::HashMatches));
        }
    }

    #[tokio::test]
    async fn known_metadata_is_looked_up_per_path() {
        let fs = MockFileSystem::new();
        let t = fs.add_file("same", b"same".to_vec());
        fs.add_file("edited", b"edited".to_vec());
        let det = ChangeDetector::new(Arc::new(fs));

        let mut known = HashMap::new();
        known.insert(
            PathBuf::from("same"),
            KnownMetadata::new(Some(hash_bytes(b"same")), Some(t)),
        );
        known.insert(
            PathBuf::from("edited"),
            KnownMetadata::new(Some(hash_bytes(b"original")), None),
        );

        let out = det
            .batch_check_verdicts(["same", "edited", "unknown"], Some(&known))
            .await;
        assert_eq!(out[&PathBuf::from("same")], Verdict::unchanged(ChangeReason::HashMatches));
        assert_eq!(out[&PathBuf::from("edited")], Verdict::changed(ChangeReason::HashDiffers));
        assert_eq!(out[&PathBuf::from("unknown")], Verdict::changed(ChangeReason::Missing));
    }

    #[tokio::test]
    async fn empty_input_yields_empty_report() {
        let det = ChangeDetector::new(Arc::new(MockFileSystem::new()));
        let out = det.batch_check(Vec::<PathBuf>::new(), None).await;
        assert!(out.is_empty());
    }
}
