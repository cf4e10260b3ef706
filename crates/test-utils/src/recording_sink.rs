use std::sync::{Arc, Mutex};

use hashgate::detect::{Diagnostic, DiagnosticLevel, DiagnosticSink};

/// Sink that keeps every diagnostic for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.records()
            .into_iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        self.records.lock().unwrap().push(diagnostic.clone());
    }
}
