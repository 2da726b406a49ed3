//! Tests for utility functions

use chrono::{TimeZone, Utc};
use slot_sniper::util::{init_tracing, now_ms, FixedClock, SystemClock, WallClock, DEFAULT_LOG_FILTER};

#[test]
fn test_fixed_clock() {
    let instant = Utc.with_ymd_and_hms(2026, 11, 6, 11, 59, 0).unwrap();
    let clock = FixedClock(instant);
    assert_eq!(clock.now(), instant);
    assert_eq!(clock.now(), clock.now());
}

#[test]
fn test_system_clock_moves_forward() {
    let clock = SystemClock;
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}

#[test]
fn test_now_ms() {
    let a = now_ms();
    let b = now_ms();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    assert!(DEFAULT_LOG_FILTER.starts_with("slot_sniper"));
}
