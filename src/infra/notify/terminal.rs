//! Terminal notifier: rings the bell and prints the outcome.

use std::io::Write;

use crate::core::{CompletionSignal, Notifier};

/// Writes completion signals to stderr, ringing the terminal bell on success.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    bells: u8,
}

impl TerminalNotifier {
    /// Notifier that rings `bells` times on success.
    pub const fn new(bells: u8) -> Self {
        Self { bells }
    }

    /// Human-readable line for `signal`.
    pub fn message(signal: &CompletionSignal) -> String {
        match signal {
            CompletionSignal::Secured { date, time, detail } => {
                format!("SECURED {date} {time} ({detail}) - finish the booking manually")
            }
            CompletionSignal::NothingFound => "nothing found in window".to_string(),
            CompletionSignal::Fatal { reason } => format!("stopped: {reason}"),
        }
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&mut self, signal: &CompletionSignal) {
        let mut stderr = std::io::stderr().lock();
        if matches!(signal, CompletionSignal::Secured { .. }) {
            for _ in 0..self.bells {
                let _ = stderr.write_all(b"\x07");
            }
        }
        let _ = writeln!(stderr, "{}", Self::message(signal));
        let _ = stderr.flush();
    }
}
