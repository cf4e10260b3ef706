// tests/detect_real_fs.rs
mod common;
use crate::common::{init_tracing, mtime, rewrite_after, write_file};

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use tempfile::tempdir;

use hashgate::detect::ChangeDetector;
use hashgate::errors::HashgateError;
use hashgate::fs::RealFileSystem;
use hashgate::{CacheStats, ChangeReason};

type TestResult = Result<(), Box<dyn Error>>;

fn detector() -> ChangeDetector {
    ChangeDetector::new(Arc::new(RealFileSystem))
}

#[test]
fn missing_file_is_changed() {
    init_tracing();
    let det = detector();
    assert!(det.has_changed(
        Path::new("/no/such/file"),
        Some("0123456789ABCDEF0123456789ABCDEF"),
        Some(SystemTime::now()),
    ));
}

#[test]
fn unchanged_round_trip_reports_unchanged() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let f = write_file(dir.path(), "f.txt", b"content C");
    let det = detector();

    let h = det.compute_hash(&f)?;
    let t = mtime(&f);

    assert!(!det.has_changed(&f, Some(h.as_str()), Some(t)));
    Ok(())
}

#[test]
fn rewritten_content_is_detected_with_and_without_mtime_baseline() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let f = write_file(dir.path(), "f.txt", b"content C");
    let det = detector();

    let h = det.compute_hash(&f)?;
    let t = mtime(&f);

    rewrite_after(&f, b"different content C prime", t);

    assert!(det.has_changed(&f, Some(h.as_str()), Some(t)));
    assert!(det.has_changed(&f, Some(h.as_str()), None));

    // Once the detector has seen the new bytes, the old hash still differs.
    det.clear_cache();
    let v = det.check(&f, Some(h.as_str()), None);
    assert_eq!(v.reason, ChangeReason::HashDiffers);
    Ok(())
}

#[test]
fn no_baseline_is_always_changed() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let f = write_file(dir.path(), "f.txt", b"whatever");
    let det = detector();

    assert!(det.has_changed(&f, None, None));
    det.compute_hash(&f)?;
    assert!(det.has_changed(&f, None, None));
    Ok(())
}

#[test]
fn hashing_is_idempotent_and_case_insensitive_on_input() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let f = write_file(dir.path(), "f.bin", &vec![7u8; 100_000]);
    let det = detector();

    let first = det.compute_hash(&f)?;
    let second = det.compute_hash(&f)?;
    assert_eq!(first, second);
    assert_eq!(first, first.to_uppercase());

    det.clear_cache();
    assert!(!det.has_changed(&f, Some(first.to_lowercase().as_str()), None));
    Ok(())
}

#[test]
fn cache_stats_track_hashed_files_and_clear() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let a = write_file(dir.path(), "a", b"12345");
    let b = write_file(dir.path(), "b", b"1234567890");
    let det = detector();

    det.compute_hash(&a)?;
    let h = det.compute_hash(&b)?;
    det.has_changed(&b, Some(h.as_str()), None);

    assert_eq!(det.cache_stats(), CacheStats { count: 2, total_bytes: 15 });

    det.clear_cache();
    assert_eq!(det.cache_stats().count, 0);
    Ok(())
}

#[test]
fn compute_hash_on_missing_file_is_an_error() {
    init_tracing();
    let dir = tempdir().unwrap();
    let det = detector();

    let err = det.compute_hash(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, HashgateError::NotFound(_)));
}

#[test]
fn directories_are_reported_changed() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let det = detector();

    let v = det.check(dir.path(), Some("00"), None);
    assert!(v.changed);
    assert_eq!(v.reason, ChangeReason::IoFailure);
    assert!(det.compute_hash(dir.path()).is_err());
    Ok(())
}
