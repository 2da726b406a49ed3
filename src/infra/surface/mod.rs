//! Automation surface backends.

pub mod memory;

pub use memory::{ClaimResponse, ScriptedSurface, SurfaceLog};
