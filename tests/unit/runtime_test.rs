//! Tests for the run entry point and report

use chrono::NaiveDate;
use slot_sniper::config::run::CONFIG_PATH_ENV;
use slot_sniper::core::{
    ElementRef, ListingEntry, ListingSnapshot, RunOutcome, RunStats, SlotRecord,
};
use slot_sniper::infra::{ClaimResponse, RecordingNotifier, ScriptedSurface, StaticSession};
use slot_sniper::runtime::{run_from_env, RunReport, RunStatus};

fn slot() -> SlotRecord {
    SlotRecord {
        minute_of_day: 420,
        resource_label: "Court 3".to_string(),
        raw_text: "Court 3 7:00 am".to_string(),
        claim_handle: ElementRef::new("slot-1"),
        listing_index: 1,
    }
}

#[test]
fn test_report_from_secured_outcome() {
    let stats = RunStats {
        passes: 1,
        searches: 1,
        claim_attempts: 1,
        commits: 1,
        elapsed_ms: 12,
    };
    let outcome = RunOutcome::Secured {
        slot: slot(),
        date: NaiveDate::from_ymd_opt(2026, 11, 7).unwrap(),
        stats,
    };

    let report = RunReport::from_outcome("run1", &outcome);
    assert_eq!(report.status, RunStatus::Secured);
    assert_eq!(report.date.as_deref(), Some("2026-11-07"));
    assert_eq!(report.time.as_deref(), Some("07:00"));
    assert_eq!(report.resource.as_deref(), Some("Court 3"));
    assert_eq!(report.detail.as_deref(), Some("Court 3 7:00 am"));
    assert_eq!(report.stats, stats);

    let json = report.to_json().unwrap();
    assert!(json.contains("\"secured\""));
    assert!(json.contains("\"run1\""));
}

#[test]
fn test_report_from_exhausted_outcome() {
    let outcome = RunOutcome::Exhausted {
        stats: RunStats::default(),
    };
    let report = RunReport::from_outcome("run2", &outcome);
    assert_eq!(report.status, RunStatus::Exhausted);
    assert!(report.date.is_none());
    assert!(report.time.is_none());

    let parsed: RunReport = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(parsed, report);
}

#[tokio::test]
async fn test_run_from_env_secures_forced_date() {
    let config = r##"{
        "resource_label": "Court 3",
        "window": { "start": "07:00", "end": "09:00" },
        "forced_date": "2026-11-07",
        "timezone": "America/New_York",
        "search": { "url": "https://booking.example/search", "date_field": "#date", "submit": "#search" },
        "claim": { "accepted_location": "/cart", "holding_marker": "#cart-timer", "retry_pause_ms": 1 },
        "poll": { "budget_secs": 5, "jitter_min_ms": 10, "jitter_max_ms": 20 }
    }"##;
    let path = std::env::temp_dir().join(format!("slot_sniper_{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, config).unwrap();
    std::env::set_var(CONFIG_PATH_ENV, &path);

    let surface = ScriptedSurface::new(ElementRef::new("#search"), "/cart", ElementRef::new("#cart-timer"))
        .with_listing(
            "11/07/2026",
            ListingSnapshot::new(vec![
                ListingEntry::inert("Court 3 6:30 am booked"),
                ListingEntry::claimable("Court 3 7:30 am", "slot-2"),
            ]),
        )
        .with_claim_responses([ClaimResponse::AcceptByLocation]);
    let notifier = RecordingNotifier::new();

    let report = run_from_env(surface, StaticSession::signed_in(), notifier.clone())
        .await
        .unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(report.status, RunStatus::Secured);
    assert_eq!(report.date.as_deref(), Some("2026-11-07"));
    assert_eq!(report.time.as_deref(), Some("07:30"));
    assert_eq!(report.stats.commits, 1);
    assert_eq!(notifier.signals().len(), 1);
}
