//! Diagnostic Sink
//!
//! Append-only collector. Concurrent reporters are serialized by a mutex;
//! there is no deduplication and messages are kept verbatim.

use super::{Diagnostic, Severity};
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct DiagnosticSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }

    pub fn report_all(&self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        let mut entries = self.entries.lock();
        entries.extend(diagnostics);
    }

    /// Stable copy of everything reported so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Number of entries with the given id, mostly used by tests.
    pub fn count_of(&self, id: &str) -> usize {
        self.entries.lock().iter().filter(|d| d.id == id).count()
    }
}
