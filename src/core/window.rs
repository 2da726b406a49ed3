//! Time-of-day windows, weekday preferences and candidate date resolution.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Last minute of a day.
pub const LAST_MINUTE_OF_DAY: u16 = 1439;

/// Default forward scan when resolving candidate dates.
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 14;

/// Upper bound on the number of candidate dates per run.
pub const MAX_CANDIDATE_DATES: usize = 2;

/// A concrete calendar date in the target timezone.
pub type CandidateDate = NaiveDate;

/// Inclusive time-of-day interval expressed in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start_minute: u16,
    end_minute: u16,
}

impl TimeWindow {
    /// Build a window; both bounds must lie in `[0, 1439]` and `start <= end`.
    pub fn new(start_minute: u16, end_minute: u16) -> Result<Self, String> {
        if start_minute > LAST_MINUTE_OF_DAY || end_minute > LAST_MINUTE_OF_DAY {
            return Err(format!(
                "window bounds must be within 0..={LAST_MINUTE_OF_DAY}, got {start_minute}..{end_minute}"
            ));
        }
        if start_minute > end_minute {
            return Err(format!(
                "window start {} is after end {}",
                format_minute(start_minute),
                format_minute(end_minute)
            ));
        }
        Ok(Self {
            start_minute,
            end_minute,
        })
    }

    /// Build a window from `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, String> {
        Self::new(parse_hh_mm(start)?, parse_hh_mm(end)?)
    }

    /// First minute of the window.
    pub const fn start_minute(&self) -> u16 {
        self.start_minute
    }

    /// Last minute of the window.
    pub const fn end_minute(&self) -> u16 {
        self.end_minute
    }

    /// Inclusive membership test.
    pub const fn contains(&self, minute_of_day: u16) -> bool {
        minute_of_day >= self.start_minute && minute_of_day <= self.end_minute
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            format_minute(self.start_minute),
            format_minute(self.end_minute)
        )
    }
}

/// Parse a 24-hour `HH:MM` string into a minute of day.
pub fn parse_hh_mm(raw: &str) -> Result<u16, String> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|e| format!("invalid time `{raw}`: {e}"))?;
    // hour < 24 and minute < 60, so this stays below 1440
    #[allow(clippy::cast_possible_truncation)]
    let minute = (time.hour() * 60 + time.minute()) as u16;
    Ok(minute)
}

/// Render a minute of day as `HH:MM`.
pub fn format_minute(minute_of_day: u16) -> String {
    format!("{:02}:{:02}", minute_of_day / 60, minute_of_day % 60)
}

/// Ordered, duplicate-free set of preferred weekdays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct DayPreference {
    days: Vec<Weekday>,
}

impl DayPreference {
    /// Build from weekdays; later duplicates are dropped.
    pub fn new(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut unique = Vec::new();
        for day in days {
            if !unique.contains(&day) {
                unique.push(day);
            }
        }
        Self { days: unique }
    }

    /// Weekdays in priority order.
    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    /// Whether `day` is preferred.
    pub fn contains(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    /// Whether no weekday is preferred.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl From<Vec<Weekday>> for DayPreference {
    fn from(days: Vec<Weekday>) -> Self {
        Self::new(days)
    }
}

impl From<DayPreference> for Vec<Weekday> {
    fn from(pref: DayPreference) -> Self {
        pref.days
    }
}

/// Next occurrence of each preferred weekday, scanning forward from today in
/// `tz` through `today + lookahead_days` inclusive.
///
/// The result is chronological, holds one date per weekday and at most
/// [`MAX_CANDIDATE_DATES`] entries. It is empty when no preferred weekday falls
/// inside the lookahead.
pub fn resolve_candidate_dates(
    preferences: &DayPreference,
    now: DateTime<Utc>,
    lookahead_days: u32,
    tz: Tz,
) -> Vec<CandidateDate> {
    let today = now.with_timezone(&tz).date_naive();
    let mut seen: Vec<Weekday> = Vec::new();
    let mut dates = Vec::new();

    for offset in 0..=lookahead_days {
        if dates.len() >= MAX_CANDIDATE_DATES {
            break;
        }
        let Some(date) = today.checked_add_days(chrono::Days::new(u64::from(offset))) else {
            break;
        };
        let weekday = date.weekday();
        if preferences.contains(weekday) && !seen.contains(&weekday) {
            seen.push(weekday);
            dates.push(date);
        }
    }

    tracing::debug!("resolved candidate dates {:?} from {}", dates, today);
    dates
}

/// Candidate dates for a run. A forced date replaces the computed set.
pub fn resolve_targets(
    forced: Option<CandidateDate>,
    preferences: &DayPreference,
    now: DateTime<Utc>,
    lookahead_days: u32,
    tz: Tz,
) -> Vec<CandidateDate> {
    if let Some(date) = forced {
        tracing::info!("forced date {} overrides day preferences", date);
        return vec![date];
    }
    resolve_candidate_dates(preferences, now, lookahead_days, tz)
}
