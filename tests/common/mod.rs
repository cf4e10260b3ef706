#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub use hashgate_test_utils::{init_tracing, with_timeout};

/// Write `content` to `dir/name` and return the full path.
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

/// Overwrite a file and move its mtime well past `previous`, so coarse
/// filesystem timestamps cannot hide the write.
pub fn rewrite_after(path: &Path, content: &[u8], previous: SystemTime) {
    fs::write(path, content).unwrap();
    let file = fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(previous + Duration::from_secs(5)).unwrap();
}
