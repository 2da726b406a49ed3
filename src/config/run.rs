//! Run configuration structures.

use std::time::Duration;

use chrono::{NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::core::{
    ClaimPolicy, DayPreference, ElementRef, JitterRange, ReleaseTarget, RunPlan, SearchPlan,
    SuccessSignals, TimeWindow,
};

/// Environment variable naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "SLOT_SNIPER_CONFIG";
/// Environment override for the forced date (`YYYY-MM-DD`).
pub const FORCED_DATE_ENV: &str = "SLOT_SNIPER_FORCED_DATE";
/// Environment override for the poll budget in seconds.
pub const BUDGET_SECS_ENV: &str = "SLOT_SNIPER_BUDGET_SECS";
/// Environment override for the resource label.
pub const RESOURCE_LABEL_ENV: &str = "SLOT_SNIPER_RESOURCE_LABEL";

const fn default_lookahead_days() -> u32 {
    crate::core::window::DEFAULT_LOOKAHEAD_DAYS
}

fn default_date_format() -> String {
    "%m/%d/%Y".into()
}

const fn default_search_settle_ms() -> u64 {
    5_000
}

const fn default_max_wait_secs() -> u64 {
    120
}

const fn default_max_retries() -> u32 {
    crate::core::claim::DEFAULT_MAX_RETRIES
}

const fn default_retry_pause_ms() -> u64 {
    150
}

const fn default_claim_settle_ms() -> u64 {
    5_000
}

const fn default_budget_secs() -> u64 {
    240
}

const fn default_jitter_min_ms() -> u64 {
    800
}

const fn default_jitter_max_ms() -> u64 {
    1_600
}

/// Acceptable slot times as `HH:MM` (24-hour).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// First acceptable time.
    pub start: String,
    /// Last acceptable time.
    pub end: String,
}

/// Search form on the booking surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Location of the search form.
    pub url: String,
    /// Field receiving the date.
    pub date_field: String,
    /// Affordance that submits the search.
    pub submit: String,
    /// `chrono` strftime format for the date value.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Bound on waiting for results, in milliseconds.
    #[serde(default = "default_search_settle_ms")]
    pub settle_timeout_ms: u64,
}

/// Daily release instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Hour, 0-23, in the run timezone.
    pub hour: u32,
    /// Minute, 0-59.
    pub minute: u32,
    /// Longest alignment wait; anything longer starts immediately.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

/// Claim protocol parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimConfig {
    /// Location fragment reached after an accepted claim.
    pub accepted_location: String,
    /// Element present once a slot sits in the holding area.
    pub holding_marker: String,
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Pause between attempts in milliseconds.
    #[serde(default = "default_retry_pause_ms")]
    pub retry_pause_ms: u64,
    /// Settle timeout after committing, in milliseconds.
    #[serde(default = "default_claim_settle_ms")]
    pub settle_timeout_ms: u64,
}

/// Poll loop parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Wall-clock budget in seconds.
    #[serde(default = "default_budget_secs")]
    pub budget_secs: u64,
    /// Lower bound of the inter-pass jitter in milliseconds.
    #[serde(default = "default_jitter_min_ms")]
    pub jitter_min_ms: u64,
    /// Upper bound of the inter-pass jitter in milliseconds.
    #[serde(default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            budget_secs: default_budget_secs(),
            jitter_min_ms: default_jitter_min_ms(),
            jitter_max_ms: default_jitter_max_ms(),
        }
    }
}

/// Root run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Exact label a listing entry must contain.
    pub resource_label: String,
    /// Acceptable slot times.
    pub window: WindowConfig,
    /// Preferred weekdays, highest priority first.
    #[serde(default)]
    pub days: Vec<Weekday>,
    /// Single date that replaces the computed candidates.
    #[serde(default)]
    pub forced_date: Option<NaiveDate>,
    /// IANA timezone of the booking site.
    pub timezone: String,
    /// Forward scan for candidate dates.
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,
    /// Release instant to align with.
    #[serde(default)]
    pub release: Option<ReleaseConfig>,
    /// Search form.
    pub search: SearchConfig,
    /// Claim protocol.
    pub claim: ClaimConfig,
    /// Poll loop.
    #[serde(default)]
    pub poll: PollConfig,
}

impl RunConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        self.resolve().map(|_| ())
    }

    /// Validate and convert into a typed plan.
    pub fn resolve(&self) -> Result<RunPlan, String> {
        if self.resource_label.trim().is_empty() {
            return Err("resource_label must not be empty".into());
        }
        let window = TimeWindow::parse(&self.window.start, &self.window.end)?;
        if self.days.is_empty() && self.forced_date.is_none() {
            return Err("either days or forced_date must be set".into());
        }
        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|e| format!("unknown timezone `{}`: {e}", self.timezone))?;
        if self.lookahead_days == 0 {
            return Err("lookahead_days must be greater than 0".into());
        }
        let release = self
            .release
            .as_ref()
            .map(|r| ReleaseTarget::new(r.hour, r.minute, tz))
            .transpose()?;

        if self.search.url.is_empty() {
            return Err("search.url must not be empty".into());
        }
        if self.search.date_field.is_empty() || self.search.submit.is_empty() {
            return Err("search.date_field and search.submit must not be empty".into());
        }
        let search = SearchPlan {
            url: self.search.url.clone(),
            date_field: ElementRef::new(self.search.date_field.clone()),
            submit: ElementRef::new(self.search.submit.clone()),
            date_format: self.search.date_format.clone(),
            settle_timeout: Duration::from_millis(self.search.settle_timeout_ms),
        };
        search
            .date_value(NaiveDate::default())
            .map_err(|e| format!("search.date_format: {e}"))?;
        if self.claim.accepted_location.is_empty() {
            return Err("claim.accepted_location must not be empty".into());
        }
        if self.claim.holding_marker.is_empty() {
            return Err("claim.holding_marker must not be empty".into());
        }
        if self.claim.settle_timeout_ms == 0 {
            return Err("claim.settle_timeout_ms must be greater than 0".into());
        }
        if self.poll.budget_secs == 0 {
            return Err("poll.budget_secs must be greater than 0".into());
        }
        let jitter = JitterRange::new(self.poll.jitter_min_ms, self.poll.jitter_max_ms)?;

        Ok(RunPlan {
            resource_label: self.resource_label.clone(),
            window,
            days: DayPreference::new(self.days.iter().copied()),
            forced_date: self.forced_date,
            tz,
            lookahead_days: self.lookahead_days,
            release,
            max_alignment_wait: Duration::from_secs(
                self.release
                    .as_ref()
                    .map_or_else(default_max_wait_secs, |r| r.max_wait_secs),
            ),
            search,
            claim: ClaimPolicy {
                max_retries: self.claim.max_retries,
                retry_pause: Duration::from_millis(self.claim.retry_pause_ms),
                settle_timeout: Duration::from_millis(self.claim.settle_timeout_ms),
            },
            signals: SuccessSignals {
                accepted_location: self.claim.accepted_location.clone(),
                holding_marker: ElementRef::new(self.claim.holding_marker.clone()),
            },
            budget: Duration::from_secs(self.poll.budget_secs),
            jitter,
        })
    }

    /// Parse run configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides looked up by variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(FORCED_DATE_ENV).filter(|v| !v.trim().is_empty()) {
            let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|e| format!("{FORCED_DATE_ENV}=`{raw}` is not a date: {e}"))?;
            self.forced_date = Some(date);
        }
        if let Some(raw) = lookup(BUDGET_SECS_ENV).filter(|v| !v.trim().is_empty()) {
            self.poll.budget_secs = raw
                .trim()
                .parse()
                .map_err(|e| format!("{BUDGET_SECS_ENV}=`{raw}` is not a number: {e}"))?;
        }
        if let Some(raw) = lookup(RESOURCE_LABEL_ENV).filter(|v| !v.is_empty()) {
            self.resource_label = raw;
        }
        Ok(())
    }

    /// Load `.env`, read the file named by [`CONFIG_PATH_ENV`], apply
    /// environment overrides and validate.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        let path = std::env::var(CONFIG_PATH_ENV)
            .map_err(|_| format!("{CONFIG_PATH_ENV} is not set"))?;
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read config `{path}`: {e}"))?;
        let mut cfg: Self =
            serde_json::from_str(&raw).map_err(|e| format!("parse error in `{path}`: {e}"))?;
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }
}
