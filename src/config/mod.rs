//! Configuration models for a run: target resource, window, dates, search
//! form, claim protocol and poll loop.

pub mod run;

pub use run::{ClaimConfig, PollConfig, ReleaseConfig, RunConfig, SearchConfig, WindowConfig};
