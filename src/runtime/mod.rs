//! Run entry point and caller-facing report.

pub mod api;

pub use api::{run_from_env, RunReport, RunStatus};
