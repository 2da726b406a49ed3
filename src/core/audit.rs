//! Audit trail of run milestones.
//!
//! Every search, claim attempt and terminal outcome of a run can be recorded to
//! an [`AuditSink`]. The in-memory sink is bounded and cheap to clone, so a
//! caller can keep a handle while the orchestrator owns another.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Run accepted its plan.
    RunStarted,
    /// Search issued for a date.
    Search,
    /// One claim attempt finished.
    ClaimAttempt,
    /// Slot secured.
    Secured,
    /// Slot unobtainable this pass.
    ClaimFailed,
    /// Full pass ended without success.
    PassEnded,
    /// Budget ran out.
    Exhausted,
    /// Run stopped on a fatal error.
    Fatal,
}

/// Audit event structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Run identifier.
    pub run_id: String,
    /// Action taken.
    pub action: AuditAction,
    /// Candidate date the event concerns, if any.
    pub date: Option<String>,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// Bounded in-memory audit sink. Clones share the same buffer.
#[derive(Clone)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<VecDeque<AuditEvent>>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Number of stored events with `action`.
    pub fn count(&self, action: AuditAction) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.action == action)
            .count()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that forwards events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, event: AuditEvent) {
        tracing::debug!(
            run_id = %event.run_id,
            action = ?event.action,
            date = ?event.date,
            detail = ?event.detail,
            "audit"
        );
    }
}

/// Helper to build an audit event with a fresh id and timestamp.
pub fn build_audit_event(
    run_id: impl Into<String>,
    action: AuditAction,
    date: Option<String>,
    detail: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        run_id: run_id.into(),
        action,
        date,
        created_at_ms: now_ms(),
        detail,
    }
}
