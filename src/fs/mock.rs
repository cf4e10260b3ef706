// src/fs/mock.rs

use super::FileSystem;
use crate::types::FileStat;
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How a mocked file misbehaves when touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    /// `metadata` fails with this kind.
    Stat(io::ErrorKind),
    /// `open_read` fails with this kind.
    Open(io::ErrorKind),
    /// The file opens, yields its first byte, then the next read fails.
    MidRead(io::ErrorKind),
}

#[derive(Debug, Clone)]
struct MockFile {
    content: Vec<u8>,
    modified: SystemTime,
    fault: Option<MockFault>,
}

/// In-memory filesystem with a deterministic clock.
///
/// Every write advances the clock by one second, so rewriting a file always
/// changes its modification time unless the test pins it explicitly.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockFile>>>,
    clock: Arc<AtomicU64>,
    opens: Arc<AtomicUsize>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            clock: Arc::new(AtomicU64::new(1_700_000_000)),
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn tick(&self) -> SystemTime {
        let secs = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    /// Create or overwrite a file, stamping it with the next clock tick.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> SystemTime {
        let modified = self.tick();
        self.add_file_with_mtime(path, content, modified);
        modified
    }

    /// Create or overwrite a file with an explicit modification time.
    pub fn add_file_with_mtime(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) {
        let mut files = self.files.lock().unwrap();
        files.insert(
            path.as_ref().to_path_buf(),
            MockFile {
                content: content.into(),
                modified,
                fault: None,
            },
        );
    }

    /// Change only the modification time of an existing file.
    pub fn set_modified(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let mut files = self.files.lock().unwrap();
        if let Some(file) = files.get_mut(path.as_ref()) {
            file.modified = modified;
        }
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files.lock().unwrap().remove(path.as_ref());
    }

    /// Make subsequent accesses to `path` fail.
    pub fn inject_fault(&self, path: impl AsRef<Path>, fault: MockFault) {
        let mut files = self.files.lock().unwrap();
        if let Some(file) = files.get_mut(path.as_ref()) {
            file.fault = Some(fault);
        }
    }

    pub fn modified(&self, path: impl AsRef<Path>) -> Option<SystemTime> {
        self.files
            .lock()
            .unwrap()
            .get(path.as_ref())
            .map(|f| f.modified)
    }

    /// Number of successful and failed `open_read` calls so far.
    ///
    /// Hashing is the only thing that opens files, so this doubles as a
    /// "was the content read" probe.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl FileSystem for MockFileSystem {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockFile {
                fault: Some(MockFault::Open(kind)),
                ..
            }) => Err(io::Error::new(*kind, format!("injected open failure: {:?}", path))),
            Some(MockFile {
                content,
                fault: Some(MockFault::MidRead(kind)),
                ..
            }) => Ok(Box::new(FailingReader {
                head: content.first().copied(),
                kind: *kind,
            })),
            Some(file) => Ok(Box::new(Cursor::new(file.content.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )),
        }
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockFile {
                fault: Some(MockFault::Stat(kind)),
                ..
            }) => Err(io::Error::new(*kind, format!("injected stat failure: {:?}", path))),
            Some(file) => Ok(FileStat {
                len: file.content.len() as u64,
                modified: file.modified,
            }),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )),
        }
    }
}

/// Reader that hands out at most one byte before failing.
struct FailingReader {
    head: Option<u8>,
    kind: io::ErrorKind,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.head.take() {
            Some(byte) if !buf.is_empty() => {
                buf[0] = byte;
                Ok(1)
            }
            _ => Err(io::Error::new(self.kind, "injected mid-stream read failure")),
        }
    }
}
