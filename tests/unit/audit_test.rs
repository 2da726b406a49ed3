//! Tests for audit sink

use slot_sniper::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(
        "run1",
        AuditAction::Search,
        Some("2026-11-07".to_string()),
        Some("4 entries, 2 qualifying".to_string()),
    );

    sink.record(event);
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].run_id, "run1");
    assert_eq!(events[0].action, AuditAction::Search);
    assert_eq!(events[0].date.as_deref(), Some("2026-11-07"));
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("run1", AuditAction::RunStarted, None, None));
    sink.record(build_audit_event("run1", AuditAction::Search, None, None));
    sink.record(build_audit_event("run1", AuditAction::Exhausted, None, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, AuditAction::Search); // First one popped
    assert_eq!(events[1].action, AuditAction::Exhausted);
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event(
        "run1",
        AuditAction::Secured,
        Some("2026-11-08".to_string()),
        Some("Court 3 7:00 am".to_string()),
    );

    assert_eq!(event.run_id, "run1");
    assert_eq!(event.action, AuditAction::Secured);
    assert_eq!(event.detail.as_deref(), Some("Court 3 7:00 am"));
    assert!(!event.event_id.is_empty());
    assert!(event.created_at_ms > 0);
}

#[test]
fn test_event_ids_are_unique() {
    let a = build_audit_event("run1", AuditAction::PassEnded, None, None);
    let b = build_audit_event("run1", AuditAction::PassEnded, None, None);
    assert_ne!(a.event_id, b.event_id);
}

#[test]
fn test_cloned_sink_shares_events() {
    let sink = InMemoryAuditSink::new(10);
    let mut writer = sink.clone();

    writer.record(build_audit_event("run1", AuditAction::ClaimAttempt, None, None));
    writer.record(build_audit_event("run1", AuditAction::ClaimFailed, None, None));
    writer.record(build_audit_event("run1", AuditAction::ClaimAttempt, None, None));

    assert_eq!(sink.count(AuditAction::ClaimAttempt), 2);
    assert_eq!(sink.count(AuditAction::ClaimFailed), 1);
    assert_eq!(sink.count(AuditAction::Secured), 0);
}

#[test]
fn test_audit_action_serializes_snake_case() {
    let json = serde_json::to_string(&AuditAction::ClaimAttempt).unwrap();
    assert_eq!(json, "\"claim_attempt\"");
}
