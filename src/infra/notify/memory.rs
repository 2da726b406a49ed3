//! Recording notifier for tests and embedding callers.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{CompletionSignal, Notifier};

/// Stores every signal it receives. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    signals: Arc<Mutex<Vec<CompletionSignal>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals received so far.
    pub fn signals(&self) -> Vec<CompletionSignal> {
        self.signals.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, signal: &CompletionSignal) {
        self.signals.lock().push(signal.clone());
    }
}
