//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDate, Weekday};
use slot_sniper::config::{
    run::{BUDGET_SECS_ENV, FORCED_DATE_ENV, RESOURCE_LABEL_ENV},
    ClaimConfig, PollConfig, RunConfig, SearchConfig, WindowConfig,
};

fn valid_config() -> RunConfig {
    RunConfig {
        resource_label: "Court 3".to_string(),
        window: WindowConfig {
            start: "07:00".to_string(),
            end: "09:00".to_string(),
        },
        days: vec![Weekday::Sat, Weekday::Sun],
        forced_date: None,
        timezone: "America/New_York".to_string(),
        lookahead_days: 14,
        release: None,
        search: SearchConfig {
            url: "https://booking.example/search".to_string(),
            date_field: "#date".to_string(),
            submit: "#search".to_string(),
            date_format: "%m/%d/%Y".to_string(),
            settle_timeout_ms: 5_000,
        },
        claim: ClaimConfig {
            accepted_location: "/cart".to_string(),
            holding_marker: "#cart-timer".to_string(),
            max_retries: 3,
            retry_pause_ms: 150,
            settle_timeout_ms: 5_000,
        },
        poll: PollConfig::default(),
    }
}

#[test]
fn test_run_config_validation() {
    assert!(valid_config().validate().is_ok());
}

#[test]
fn test_run_config_invalid_label() {
    let mut invalid = valid_config();
    invalid.resource_label = "   ".to_string();
    assert!(invalid.validate().is_err());
}

#[test]
fn test_run_config_invalid_window() {
    let mut invalid = valid_config();
    invalid.window.start = "10:00".to_string();
    assert!(invalid.validate().is_err());

    let mut invalid = valid_config();
    invalid.window.end = "7pm".to_string();
    assert!(invalid.validate().is_err());
}

#[test]
fn test_run_config_requires_days_or_forced_date() {
    let mut invalid = valid_config();
    invalid.days.clear();
    assert!(invalid.validate().is_err());

    invalid.forced_date = NaiveDate::from_ymd_opt(2026, 11, 7);
    assert!(invalid.validate().is_ok());
}

#[test]
fn test_run_config_invalid_timezone() {
    let mut invalid = valid_config();
    invalid.timezone = "Mars/Olympus".to_string();
    let err = invalid.validate().unwrap_err();
    assert!(err.contains("Mars/Olympus"));
}

#[test]
fn test_run_config_invalid_jitter() {
    let mut invalid = valid_config();
    invalid.poll.jitter_min_ms = 2_000;
    invalid.poll.jitter_max_ms = 1_000;
    assert!(invalid.validate().is_err());
}

#[test]
fn test_run_config_invalid_budget() {
    let mut invalid = valid_config();
    invalid.poll.budget_secs = 0;
    assert!(invalid.validate().is_err());
}

#[test]
fn test_run_config_invalid_signals() {
    let mut invalid = valid_config();
    invalid.claim.accepted_location = String::new();
    assert!(invalid.validate().is_err());

    let mut invalid = valid_config();
    invalid.claim.holding_marker = String::new();
    assert!(invalid.validate().is_err());
}

#[test]
fn test_run_config_invalid_date_format() {
    let mut invalid = valid_config();
    invalid.search.date_format = "%Q".to_string();
    assert!(invalid.validate().is_err());
}

#[test]
fn test_run_config_date_format_needs_date_fields_only() {
    let mut invalid = valid_config();
    invalid.search.date_format = "%Y-%m-%d %H:%M".to_string();
    let err = invalid.validate().unwrap_err();
    assert!(err.contains("search.date_format"));

    let mut invalid = valid_config();
    invalid.search.date_format = "%d.%m.%Y %z".to_string();
    assert!(invalid.validate().is_err());

    let mut valid = valid_config();
    valid.search.date_format = "%A, %B %-d %Y".to_string();
    assert!(valid.validate().is_ok());
}

#[test]
fn test_run_config_invalid_release() {
    let json = r##"{
        "resource_label": "Court 3",
        "window": { "start": "07:00", "end": "09:00" },
        "days": ["Sat"],
        "timezone": "America/New_York",
        "release": { "hour": 24, "minute": 0 },
        "search": { "url": "https://booking.example/search", "date_field": "#date", "submit": "#search" },
        "claim": { "accepted_location": "/cart", "holding_marker": "#cart-timer" }
    }"##;
    assert!(RunConfig::from_json_str(json).is_err());
}

#[test]
fn test_run_config_from_json_defaults() {
    let json = r##"{
        "resource_label": "Court 3",
        "window": { "start": "07:00", "end": "09:00" },
        "days": ["Sat", "Sun"],
        "timezone": "America/New_York",
        "release": { "hour": 7, "minute": 0 },
        "search": { "url": "https://booking.example/search", "date_field": "#date", "submit": "#search" },
        "claim": { "accepted_location": "/cart", "holding_marker": "#cart-timer" }
    }"##;
    let cfg = RunConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.lookahead_days, 14);
    assert_eq!(cfg.search.date_format, "%m/%d/%Y");
    assert_eq!(cfg.claim.max_retries, 3);
    assert_eq!(cfg.poll.budget_secs, 240);
    assert_eq!(cfg.poll.jitter_min_ms, 800);
    assert_eq!(cfg.poll.jitter_max_ms, 1_600);
    assert_eq!(cfg.release.as_ref().map(|r| r.max_wait_secs), Some(120));

    let plan = cfg.resolve().unwrap();
    assert_eq!(plan.window.start_minute(), 420);
    assert_eq!(plan.window.end_minute(), 540);
    assert_eq!(plan.days.days(), &[Weekday::Sat, Weekday::Sun]);
    assert_eq!(plan.tz, chrono_tz::America::New_York);
    assert_eq!(plan.budget, Duration::from_secs(240));
    assert_eq!(plan.max_alignment_wait, Duration::from_secs(120));
    assert_eq!(plan.claim.retry_pause, Duration::from_millis(150));
    assert_eq!(plan.release.map(|r| (r.hour, r.minute)), Some((7, 0)));
}

#[test]
fn test_run_config_from_json_parse_error() {
    let err = RunConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_apply_overrides() {
    let vars: HashMap<&str, &str> = [
        (FORCED_DATE_ENV, "2026-11-07"),
        (BUDGET_SECS_ENV, "60"),
        (RESOURCE_LABEL_ENV, "Court 5"),
    ]
    .into_iter()
    .collect();

    let mut cfg = valid_config();
    cfg.apply_overrides(|key| vars.get(key).map(|v| (*v).to_string()))
        .unwrap();

    assert_eq!(cfg.forced_date, NaiveDate::from_ymd_opt(2026, 11, 7));
    assert_eq!(cfg.poll.budget_secs, 60);
    assert_eq!(cfg.resource_label, "Court 5");
}

#[test]
fn test_apply_overrides_ignores_blank_values() {
    let mut cfg = valid_config();
    cfg.apply_overrides(|key| (key == FORCED_DATE_ENV).then(|| "  ".to_string()))
        .unwrap();
    assert!(cfg.forced_date.is_none());
}

#[test]
fn test_apply_overrides_rejects_bad_values() {
    let mut cfg = valid_config();
    let err = cfg
        .apply_overrides(|key| (key == FORCED_DATE_ENV).then(|| "11/07/2026".to_string()))
        .unwrap_err();
    assert!(err.contains(FORCED_DATE_ENV));

    let mut cfg = valid_config();
    assert!(cfg
        .apply_overrides(|key| (key == BUDGET_SECS_ENV).then(|| "soon".to_string()))
        .is_err());
}
