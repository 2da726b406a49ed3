//! Slot acquisition core: time windows, extraction, release alignment, the
//! claim state machine and the poll orchestrator.

pub mod audit;
pub mod claim;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod plan;
pub mod release;
pub mod surface;
pub mod window;

pub use audit::{
    build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink,
};
pub use claim::{
    claim_slot, ClaimMachine, ClaimOutcome, ClaimPolicy, ClaimReport, ClaimState, SuccessSignals,
};
pub use error::{AppResult, RunError, SurfaceError};
pub use extract::{extract, parse_clock_token, to_minute_of_day, SlotRecord};
pub use orchestrator::{jittered_delay, Orchestrator, RunOutcome, RunStats, SessionBudget};
pub use plan::{JitterRange, RunPlan, SearchPlan};
pub use release::{alignment_delay, wait_duration, ReleaseTarget};
pub use surface::{
    AutomationSurface, CompletionSignal, ElementRef, ListingEntry, ListingSnapshot, Notifier,
    SessionProvider, TriggerMode,
};
pub use window::{
    format_minute, parse_hh_mm, resolve_candidate_dates, resolve_targets, CandidateDate,
    DayPreference, TimeWindow,
};
