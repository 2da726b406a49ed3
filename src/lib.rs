//! # Slot Sniper
//!
//! Acquire a scarce reservation slot on a third-party booking surface before
//! competing actors take it, then hand off to a human for final confirmation.
//!
//! The crate covers the parts with real engineering difficulty:
//!
//! - **Candidate dates**: a time-of-day window and preferred weekdays become
//!   concrete dates in the booking site's timezone ([`core::window`]).
//! - **Extraction and ranking**: unstructured listing entries become typed slot
//!   records, filtered by resource label and window, earliest first
//!   ([`core::extract`]).
//! - **Claim protocol**: probe, commit, verify against two independent success
//!   signals, retry a bounded number of times with fresh handles
//!   ([`core::claim`]).
//! - **Polling**: align with the daily release instant, iterate dates, back off
//!   with jitter, stop deterministically when the budget runs out
//!   ([`core::release`], [`core::orchestrator`]).
//!
//! Rendering, credentials and session persistence stay behind the
//! [`core::AutomationSurface`] and [`core::SessionProvider`] traits. The run
//! never pays or checks out: it stops once a claim is provisionally secured and
//! signals a human through a [`core::Notifier`].
//!
//! ```rust,ignore
//! use slot_sniper::builders::build_orchestrator;
//! use slot_sniper::config::RunConfig;
//! use slot_sniper::infra::{StaticSession, TerminalNotifier};
//!
//! let cfg = RunConfig::from_env()?;
//! let mut orchestrator = build_orchestrator(&cfg, my_surface, StaticSession::signed_in(), TerminalNotifier::default())?;
//! match orchestrator.run().await? {
//!     RunOutcome::Secured { slot, date, .. } => println!("{date} {}", slot.time_label()),
//!     RunOutcome::Exhausted { .. } => println!("nothing found"),
//! }
//! ```
//!
//! For complete scenarios, see `tests/orchestrator_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Slot acquisition core.
pub mod core;
/// Configuration models for a run.
pub mod config;
/// Builders to construct an orchestrator from configuration.
pub mod builders;
/// Infrastructure adapters for the surface, sessions and notifications.
pub mod infra;
/// Run entry point and caller-facing report.
pub mod runtime;
/// Shared utilities.
pub mod util;
