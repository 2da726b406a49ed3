//! Tests for builders

use chrono::Weekday;
use slot_sniper::builders::build_orchestrator;
use slot_sniper::config::{ClaimConfig, PollConfig, RunConfig, SearchConfig, WindowConfig};
use slot_sniper::core::RunError;
use slot_sniper::infra::{RecordingNotifier, ScriptedSurface, StaticSession};

fn config() -> RunConfig {
    RunConfig {
        resource_label: "Court 3".to_string(),
        window: WindowConfig {
            start: "07:00".to_string(),
            end: "09:00".to_string(),
        },
        days: vec![Weekday::Sat],
        forced_date: None,
        timezone: "Europe/London".to_string(),
        lookahead_days: 7,
        release: None,
        search: SearchConfig {
            url: "https://booking.example/search".to_string(),
            date_field: "#date".to_string(),
            submit: "#search".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            settle_timeout_ms: 1_000,
        },
        claim: ClaimConfig {
            accepted_location: "/cart".to_string(),
            holding_marker: "#cart-timer".to_string(),
            max_retries: 2,
            retry_pause_ms: 50,
            settle_timeout_ms: 1_000,
        },
        poll: PollConfig::default(),
    }
}

fn surface_for(cfg: &RunConfig) -> ScriptedSurface {
    let plan = cfg.resolve().unwrap();
    ScriptedSurface::for_plan(&plan)
}

#[test]
fn test_build_orchestrator() {
    let cfg = config();
    let orchestrator = build_orchestrator(
        &cfg,
        surface_for(&cfg),
        StaticSession::signed_in(),
        RecordingNotifier::new(),
    )
    .unwrap();

    let plan = orchestrator.plan();
    assert_eq!(plan.resource_label, "Court 3");
    assert_eq!(plan.claim.max_retries, 2);
    assert_eq!(plan.search.submit.as_str(), "#search");
    assert_eq!(plan.signals.accepted_location, "/cart");
    assert!(!orchestrator.run_id().is_empty());
}

#[test]
fn test_build_orchestrator_invalid_config() {
    let cfg = config();
    let surface = surface_for(&cfg);

    let mut invalid = cfg;
    invalid.timezone = "Nowhere/Special".to_string();
    let result = build_orchestrator(
        &invalid,
        surface,
        StaticSession::signed_in(),
        RecordingNotifier::new(),
    );

    match result {
        Err(RunError::Config(msg)) => assert!(msg.starts_with("config invalid")),
        Err(other) => panic!("expected config error, got {other}"),
        Ok(_) => panic!("expected config error"),
    }
}
