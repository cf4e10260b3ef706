// src/detect/mod.rs

//! File change detection.
//!
//! This module is responsible for:
//! - Streaming content digests (`hash`).
//! - The shared path -> snapshot cache (`cache`).
//! - The staged single-file decision (`engine`).
//! - Concurrent checks over many paths (`batch`).
//! - Where diagnostics go (`sink`).
//!
//! It does **not** persist anything or watch the filesystem; callers pull
//! verdicts when they need them.

pub mod batch;
pub mod cache;
pub mod engine;
pub mod hash;
pub mod sink;

pub use cache::MetadataCache;
pub use engine::{ChangeDetector, DetectorOptions};
pub use hash::{compute_file_hash, compute_file_hash_chunked, DEFAULT_CHUNK_SIZE};
pub use sink::{Diagnostic, DiagnosticLevel, DiagnosticSink, NoopSink, Stage, TracingSink};
