//! External collaborator interfaces: the automation surface, the session
//! provider and the completion notifier.
//!
//! The orchestrator owns exactly one surface for the lifetime of a run. Other
//! components only see [`ListingSnapshot`] values and opaque [`ElementRef`]s.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::SurfaceError;

/// Opaque reference to something on the external surface: an input field, a
/// button, a claim affordance or a marker element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementRef(pub String);

impl ElementRef {
    /// Wrap a selector or handle string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw selector or handle string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an affordance is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Feasibility check that must not commit anything.
    Probe,
    /// The real action.
    Commit,
}

/// One entry of a listing as rendered by the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Free-form text of the entry.
    pub text: String,
    /// Claim affordance attached to the entry, if one is discoverable.
    pub affordance: Option<ElementRef>,
}

impl ListingEntry {
    /// Entry with a claim affordance.
    pub fn claimable(text: impl Into<String>, affordance: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            affordance: Some(ElementRef::new(affordance)),
        }
    }

    /// Entry without any claim affordance.
    pub fn inert(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            affordance: None,
        }
    }
}

/// Immutable listing captured from the surface after a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSnapshot {
    /// Entries in listing order.
    pub entries: Vec<ListingEntry>,
}

impl ListingSnapshot {
    /// Build a snapshot from entries.
    pub const fn new(entries: Vec<ListingEntry>) -> Self {
        Self { entries }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the listing is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single browser-like automation surface.
///
/// Presence checks are best effort and report `false` instead of failing.
#[async_trait]
pub trait AutomationSurface: Send {
    /// Load a location.
    async fn navigate(&mut self, url: &str) -> Result<(), SurfaceError>;
    /// Type a value into a field.
    async fn fill_field(&mut self, field: &ElementRef, value: &str) -> Result<(), SurfaceError>;
    /// Click or otherwise activate an affordance.
    async fn trigger_affordance(
        &mut self,
        target: &ElementRef,
        mode: TriggerMode,
    ) -> Result<(), SurfaceError>;
    /// Capture the current listing.
    async fn query_snapshot(&mut self) -> Result<ListingSnapshot, SurfaceError>;
    /// Wait until the surface stops changing. Returns `false` on timeout.
    async fn wait_settled(&mut self, timeout: Duration) -> bool;
    /// Identifier of the current location (for example a URL).
    async fn current_location(&mut self) -> String;
    /// Whether an element is present.
    async fn is_present(&mut self, target: &ElementRef) -> bool;
}

/// Authentication for the surface.
///
/// Credential storage and session persistence stay behind this trait; the
/// orchestrator lends its surface for the duration of each call.
#[async_trait]
pub trait SessionProvider<S: AutomationSurface>: Send {
    /// Whether the surface currently holds an authenticated session.
    async fn is_authenticated(&mut self, surface: &mut S) -> bool;
    /// Establish a session.
    async fn authenticate(&mut self, surface: &mut S) -> Result<(), SurfaceError>;
    /// Save the session after a successful authentication.
    async fn persist(&mut self, _surface: &mut S) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// Human-facing completion signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CompletionSignal {
    /// A slot is provisionally held and must be finished by hand.
    Secured {
        /// Target date, `YYYY-MM-DD`.
        date: String,
        /// Slot time, `HH:MM`.
        time: String,
        /// Listing text of the slot.
        detail: String,
    },
    /// The budget ran out without a secured slot.
    NothingFound,
    /// The run stopped on a fatal error.
    Fatal {
        /// Cause.
        reason: String,
    },
}

/// Receiver of completion signals.
pub trait Notifier: Send {
    /// Deliver a signal.
    fn notify(&mut self, signal: &CompletionSignal);
}
