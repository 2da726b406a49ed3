//! Infrastructure adapters for the automation surface, sessions and
//! completion signals.

pub mod notify;
pub mod session;
pub mod surface;

pub use notify::{RecordingNotifier, TerminalNotifier};
pub use session::StaticSession;
pub use surface::{ClaimResponse, ScriptedSurface, SurfaceLog};
