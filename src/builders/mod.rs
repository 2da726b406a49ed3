//! Builders to construct an orchestrator from configuration.

pub mod orchestrator_builder;

pub use orchestrator_builder::build_orchestrator;
