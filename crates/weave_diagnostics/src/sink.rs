//! Shared collector for the diagnostics of one run.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Collects diagnostics from every stage of a routing run.
///
/// Stages only need `&DiagnosticSink`. Per-severity counts are kept in atomics
/// so a caller can ask whether the run has failed without taking the lock.
pub struct DiagnosticSink {
    collected: Mutex<Vec<Diagnostic>>,
    counts: [AtomicUsize; 3],
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            collected: Mutex::new(Vec::new()),
            counts: Default::default(),
        }
    }

    fn collected(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        // Pushing a diagnostic cannot leave the vector torn, so a poisoned lock is still usable.
        self.collected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        self.counts[diag.severity.slot()].fetch_add(1, Ordering::Relaxed);
        self.collected().push(diag);
    }

    /// Number of diagnostics of `severity` emitted so far, drained ones included.
    pub fn count(&self, severity: Severity) -> usize {
        self.counts[severity.slot()].load(Ordering::Relaxed)
    }

    /// Number of errors emitted so far.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Returns `true` once any error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Drains the collected diagnostics in emission order.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.collected())
    }

    /// A copy of the collected diagnostics in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.collected().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
