//! Alignment with the daily release instant.
//!
//! New slots appear at a known wall-clock time in the booking site's timezone.
//! Starting a few seconds early helps; waiting for hours does not, so any wait
//! above a short ceiling is skipped.

use std::time::Duration;

use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Default ceiling above which alignment is skipped.
pub const DEFAULT_MAX_ALIGNMENT_WAIT: Duration = Duration::from_secs(120);

/// Daily release instant as a wall-clock time in a timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseTarget {
    /// Hour, 0-23.
    pub hour: u32,
    /// Minute, 0-59.
    pub minute: u32,
    /// Timezone the wall-clock time is expressed in.
    pub tz: Tz,
}

impl ReleaseTarget {
    /// Build a target, rejecting impossible wall-clock times.
    pub fn new(hour: u32, minute: u32, tz: Tz) -> Result<Self, String> {
        if NaiveTime::from_hms_opt(hour, minute, 0).is_none() {
            return Err(format!("invalid release time {hour:02}:{minute:02}"));
        }
        Ok(Self { hour, minute, tz })
    }
}

/// Resolve a local wall-clock time on `date` to an instant.
///
/// Ambiguous times (DST fall-back) take the earliest instant. Times inside a
/// DST gap move forward minute by minute to the first valid local time.
fn resolve_local(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    let mut local: NaiveDateTime = date.and_time(time);
    // gaps are at most a few hours long
    for _ in 0..=(4 * 60) {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => return Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest.with_timezone(&Utc)),
            LocalResult::None => local += chrono::Duration::minutes(1),
        }
    }
    None
}

/// Real elapsed time from `now` until the next occurrence of
/// `hour:minute` in `tz`.
///
/// A target equal to `now` yields zero. Arithmetic goes through local
/// wall-clock dates, so days that are 23 or 25 hours long are handled.
pub fn wait_duration(now: DateTime<Utc>, hour: u32, minute: u32, tz: Tz) -> Duration {
    let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
        return Duration::ZERO;
    };
    let today = now.with_timezone(&tz).date_naive();

    for offset in 0..=2u64 {
        let Some(date) = today.checked_add_days(Days::new(offset)) else {
            break;
        };
        let Some(target) = resolve_local(date, time, tz) else {
            continue;
        };
        if target >= now {
            return (target - now).to_std().unwrap_or(Duration::ZERO);
        }
    }
    Duration::ZERO
}

/// How long to sleep before the first pass.
///
/// Zero when the next release is further away than `ceiling`, which also
/// covers the case where today's release instant has already passed.
pub fn alignment_delay(now: DateTime<Utc>, target: &ReleaseTarget, ceiling: Duration) -> Duration {
    let wait = wait_duration(now, target.hour, target.minute, target.tz);
    if wait > ceiling {
        tracing::info!(
            "release {:02}:{:02} {} is {}s away, starting immediately",
            target.hour,
            target.minute,
            target.tz,
            wait.as_secs()
        );
        return Duration::ZERO;
    }
    wait
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::London;

    #[test]
    fn test_gap_resolves_to_first_valid_minute() {
        // 01:30 on 2026-03-29 does not exist in London
        let date = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
        let time = NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        let resolved = resolve_local(date, time, London).unwrap();
        assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 3, 29, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_repeated_time_takes_earliest() {
        // 01:30 on 2026-10-25 happens in BST and again in GMT
        let date = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
        let time = NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        let resolved = resolve_local(date, time, London).unwrap();
        assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 10, 25, 0, 30, 0).unwrap());
    }
}
