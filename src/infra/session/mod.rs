//! Session provider backends.

pub mod memory;

pub use memory::StaticSession;
