// src/detect/sink.rs

//! Diagnostic sink injected into the detector.
//!
//! The detector reports verdicts and absorbed failures here. Sinks return
//! nothing, so whatever they do with a diagnostic cannot change a verdict.
//! `NoopSink` is used when no sink is supplied.

use std::fmt::Debug;
use std::path::PathBuf;

use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Debug,
    Warn,
}

/// Which part of the staged check produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Existence,
    ModifiedTime,
    Cache,
    Hash,
    Verdict,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Existence => "existence",
            Stage::ModifiedTime => "mtime",
            Stage::Cache => "cache",
            Stage::Hash => "hash",
            Stage::Verdict => "verdict",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub stage: Stage,
    pub path: PathBuf,
    pub message: String,
}

pub trait DiagnosticSink: Send + Sync + Debug {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn emit(&self, _diagnostic: &Diagnostic) {}
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, d: &Diagnostic) {
        match d.level {
            DiagnosticLevel::Debug => {
                debug!(path = ?d.path, stage = d.stage.as_str(), "{}", d.message)
            }
            DiagnosticLevel::Warn => {
                warn!(path = ?d.path, stage = d.stage.as_str(), "{}", d.message)
            }
        }
    }
}
