// src/detect/hash.rs

//! Streaming content digests.
//!
//! Files are read in fixed-size chunks and fed to a blake3 hasher whose
//! extendable output is cut to 128 bits. The digest is rendered as uppercase
//! hex, which is the single canonical form every comparison starts from.

use std::fmt::Write as _;
use std::io::{ErrorKind, Read};
use std::path::Path;

use blake3::Hasher;
use tracing::trace;

use crate::errors::{HashgateError, Result};
use crate::fs::FileSystem;

/// Default number of bytes read per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Digest width in bytes (128 bits).
pub const DIGEST_LEN: usize = 16;

/// Compute the digest of a single file using the default chunk size.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    compute_file_hash_chunked(fs, path, DEFAULT_CHUNK_SIZE)
}

/// Compute the digest of a single file, reading `chunk_size` bytes at a time.
///
/// Memory use is bounded by `chunk_size` regardless of file length.
pub fn compute_file_hash_chunked(
    fs: &dyn FileSystem,
    path: &Path,
    chunk_size: usize,
) -> Result<String> {
    let mut reader = fs
        .open_read(path)
        .map_err(|e| HashgateError::from_io(path, e))?;

    let mut hasher = Hasher::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total: u64 = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(HashgateError::from_io(path, e)),
        };
        hasher.update(&buf[..n]);
        total += n as u64;
    }

    let digest = finalize_hex(&hasher);
    trace!(?path, bytes = total, digest = %digest, "hashed file");
    Ok(digest)
}

/// Digest of an in-memory buffer, in the same canonical form as file digests.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    finalize_hex(&hasher)
}

fn finalize_hex(hasher: &Hasher) -> String {
    let mut out = [0u8; DIGEST_LEN];
    hasher.finalize_xof().fill(&mut out);

    let mut hex = String::with_capacity(DIGEST_LEN * 2);
    for byte in out {
        // Writing to a String cannot fail.
        let _ = write!(hex, "{byte:02X}");
    }
    hex
}

/// Treat empty or non-hex caller hashes as absent.
pub fn normalize_known_hash(hash: Option<&str>) -> Option<&str> {
    let trimmed = hash?.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(trimmed)
}

/// Case-insensitive digest comparison.
pub fn digests_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::{MockFault, MockFileSystem};
    use std::path::PathBuf;

    #[test]
    fn digest_is_uppercase_128_bit_hex() {
        let fs = MockFileSystem::new();
        fs.add_file("a.txt", b"hello world".to_vec());

        let hash = compute_file_hash(&fs, &PathBuf::from("a.txt")).unwrap();
        assert_eq!(hash.len(), DIGEST_LEN * 2);
        assert!(hash.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()));
        assert_eq!(hash, hash_bytes(b"hello world"));
    }

    #[test]
    fn chunk_size_does_not_change_digest() {
        let fs = MockFileSystem::new();
        let content: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        fs.add_file("big.bin", content.clone());
        let path = PathBuf::from("big.bin");

        let one = compute_file_hash_chunked(&fs, &path, 1).unwrap();
        let odd = compute_file_hash_chunked(&fs, &path, 4097).unwrap();
        let huge = compute_file_hash_chunked(&fs, &path, 1 << 20).unwrap();
        assert_eq!(one, odd);
        assert_eq!(odd, huge);
        assert_eq!(huge, hash_bytes(&content));
    }

    #[test]
    fn empty_file_has_a_digest() {
        let fs = MockFileSystem::new();
        fs.add_file("empty", Vec::new());
        let hash = compute_file_hash(&fs, &PathBuf::from("empty")).unwrap();
        assert_eq!(hash, hash_bytes(b""));
    }

    #[test]
    fn missing_file_reports_not_found() {
        let fs = MockFileSystem::new();
        let err = compute_file_hash(&fs, &PathBuf::from("nope")).unwrap_err();
        assert!(matches!(err, HashgateError::NotFound(_)));
        assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn mid_stream_failure_propagates_kind() {
        let fs = MockFileSystem::new();
        fs.add_file("flaky", b"abcdef".to_vec());
        fs.inject_fault("flaky", MockFault::MidRead(ErrorKind::PermissionDenied));

        let err = compute_file_hash(&fs, &PathBuf::from("flaky")).unwrap_err();
        assert_eq!(err.io_kind(), Some(ErrorKind::PermissionDenied));
    }

    #[test]
    fn known_hash_normalisation() {
        assert_eq!(normalize_known_hash(None), None);
        assert_eq!(normalize_known_hash(Some("")), None);
        assert_eq!(normalize_known_hash(Some("   ")), None);
        assert_eq!(normalize_known_hash(Some("xyz")), None);
        assert_eq!(normalize_known_hash(Some(" abCD12 ")), Some("abCD12"));
    }

    #[test]
    fn digest_comparison_ignores_case() {
        assert!(digests_equal("ABCDEF", "abcdef"));
        assert!(!digests_equal("ABCDEF", "ABCDE0"));
    }
}
