//! Completion notifiers.

pub mod memory;
pub mod terminal;

pub use memory::RecordingNotifier;
pub use terminal::TerminalNotifier;
