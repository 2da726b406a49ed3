//! Validated, typed run parameters.
//!
//! A [`RunPlan`] is what the orchestrator consumes; it is produced from a
//! `RunConfig` by the builder after validation.

use std::fmt::Write;
use std::time::Duration;

use chrono_tz::Tz;

use super::claim::{ClaimPolicy, SuccessSignals};
use super::release::ReleaseTarget;
use super::surface::ElementRef;
use super::window::{CandidateDate, DayPreference, TimeWindow};

/// Uniform jitter range for the pause between passes, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterRange {
    /// Lower bound, inclusive.
    pub min_ms: u64,
    /// Upper bound, inclusive.
    pub max_ms: u64,
}

impl JitterRange {
    /// Build a range; `min_ms` must not exceed `max_ms`.
    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self, String> {
        if min_ms > max_ms {
            return Err(format!("jitter min {min_ms}ms exceeds max {max_ms}ms"));
        }
        Ok(Self { min_ms, max_ms })
    }
}

/// How a search for one date is issued on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    /// Location of the search form.
    pub url: String,
    /// Field receiving the date.
    pub date_field: ElementRef,
    /// Affordance that submits the search.
    pub submit: ElementRef,
    /// `chrono` format for the date value.
    pub date_format: String,
    /// Bound on waiting for results to render.
    pub settle_timeout: Duration,
}

impl SearchPlan {
    /// Text filled into the date field for `date`.
    ///
    /// Fails when the format asks for fields a calendar date does not carry,
    /// such as hours or a UTC offset.
    pub fn date_value(&self, date: CandidateDate) -> Result<String, String> {
        let mut value = String::new();
        write!(value, "{}", date.format(&self.date_format)).map_err(|_| {
            format!(
                "date format `{}` cannot render a calendar date",
                self.date_format
            )
        })?;
        Ok(value)
    }
}

/// Everything the orchestrator needs for one run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Exact label a listing entry must contain.
    pub resource_label: String,
    /// Acceptable slot times.
    pub window: TimeWindow,
    /// Preferred weekdays.
    pub days: DayPreference,
    /// Date that replaces the computed candidates.
    pub forced_date: Option<CandidateDate>,
    /// Timezone of the booking site.
    pub tz: Tz,
    /// Forward scan for candidate dates.
    pub lookahead_days: u32,
    /// Daily release instant to align with.
    pub release: Option<ReleaseTarget>,
    /// Longest wait accepted for release alignment.
    pub max_alignment_wait: Duration,
    /// Search parameters.
    pub search: SearchPlan,
    /// Claim retry policy.
    pub claim: ClaimPolicy,
    /// Claim success signals.
    pub signals: SuccessSignals,
    /// Wall-clock budget for the poll loop.
    pub budget: Duration,
    /// Pause between unsuccessful passes.
    pub jitter: JitterRange,
}
