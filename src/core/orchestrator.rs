//! Poll/search orchestration.
//!
//! The orchestrator owns the surface, the session provider and the session
//! budget for one run. It resolves candidate dates once, aligns with the
//! release instant once, then runs passes over the dates until a slot is
//! secured or the budget runs out. A pass searches each date, claims the
//! earliest qualifying slot and moves on when the claim fails. Between passes
//! it sleeps a uniformly jittered delay.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::audit::{build_audit_event, AuditAction, AuditSink};
use super::claim::{claim_slot, ClaimOutcome};
use super::extract::{extract, SlotRecord};
use super::plan::{JitterRange, RunPlan};
use super::release::alignment_delay;
use super::surface::{
    AutomationSurface, CompletionSignal, ListingSnapshot, Notifier, SessionProvider, TriggerMode,
};
use super::window::{resolve_targets, CandidateDate};
use super::{RunError, SurfaceError};
use crate::util::clock::{SystemClock, WallClock};

/// Wall-clock budget of a run. Owned by the orchestrator alone.
#[derive(Debug, Clone, Copy)]
pub struct SessionBudget {
    started: Instant,
    deadline: Instant,
}

impl SessionBudget {
    /// Start a budget of `budget` from now.
    pub fn start(budget: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: started + budget,
        }
    }

    /// Time since the budget started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has been reached.
    pub fn is_exhausted(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Counters for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Passes started.
    pub passes: u32,
    /// Searches that produced a listing.
    pub searches: u32,
    /// Claim attempts across all slots.
    pub claim_attempts: u32,
    /// Committing claim actions the surface accepted.
    pub commits: u32,
    /// Time spent in the poll loop, in milliseconds.
    pub elapsed_ms: u64,
}

/// Terminal result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A slot is held and awaits manual confirmation.
    Secured {
        /// The slot.
        slot: SlotRecord,
        /// Date it was found on.
        date: CandidateDate,
        /// Counters.
        stats: RunStats,
    },
    /// Nothing secured before the budget ran out, or nothing to search.
    Exhausted {
        /// Counters.
        stats: RunStats,
    },
}

impl RunOutcome {
    /// Counters of the run.
    pub const fn stats(&self) -> &RunStats {
        match self {
            Self::Secured { stats, .. } | Self::Exhausted { stats } => stats,
        }
    }

    /// Whether a slot was secured.
    pub const fn is_secured(&self) -> bool {
        matches!(self, Self::Secured { .. })
    }
}

/// Uniform delay within `range`.
pub fn jittered_delay<R: Rng>(range: JitterRange, rng: &mut R) -> Duration {
    Duration::from_millis(rng.random_range(range.min_ms..=range.max_ms))
}

/// Drives a run against one surface.
pub struct Orchestrator<S, A, N>
where
    S: AutomationSurface,
    A: SessionProvider<S>,
    N: Notifier,
{
    plan: RunPlan,
    surface: S,
    session: A,
    notifier: N,
    clock: Box<dyn WallClock>,
    audit: Option<Box<dyn AuditSink>>,
    rng: StdRng,
    run_id: String,
}

impl<S, A, N> Orchestrator<S, A, N>
where
    S: AutomationSurface,
    A: SessionProvider<S>,
    N: Notifier,
{
    /// Create an orchestrator from its parts.
    pub fn new(plan: RunPlan, surface: S, session: A, notifier: N) -> Self {
        Self {
            plan,
            surface,
            session,
            notifier,
            clock: Box::new(SystemClock),
            audit: None,
            rng: StdRng::from_os_rng(),
            run_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Replace the wall clock used for calendar decisions.
    #[must_use]
    pub fn with_clock(mut self, clock: impl WallClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Seed the jitter generator.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Run identifier used in audit events.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The plan being executed.
    pub const fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// Borrow the surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Give the surface back, in whatever state the run left it.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Run until a slot is secured or the budget is spent.
    ///
    /// `Exhausted` is a normal outcome. Errors are limited to authentication
    /// that cannot be re-established.
    pub async fn run(&mut self) -> Result<RunOutcome, RunError> {
        match self.run_inner().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!("run {} stopped: {}", self.run_id, e);
                self.record(AuditAction::Fatal, None, Some(e.to_string()));
                self.notifier.notify(&CompletionSignal::Fatal {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_inner(&mut self) -> Result<RunOutcome, RunError> {
        let now = self.clock.now();
        let dates = resolve_targets(
            self.plan.forced_date,
            &self.plan.days,
            now,
            self.plan.lookahead_days,
            self.plan.tz,
        );
        self.record(
            AuditAction::RunStarted,
            None,
            Some(format!("{} candidate date(s)", dates.len())),
        );
        tracing::info!(
            "run {} targeting {:?} for `{}` in {}",
            self.run_id,
            dates,
            self.plan.resource_label,
            self.plan.window
        );

        let targets = dates
            .iter()
            .map(|&date| Ok((date, self.plan.search.date_value(date)?)))
            .collect::<Result<Vec<_>, String>>()
            .map_err(RunError::Config)?;

        let mut stats = RunStats::default();
        if targets.is_empty() {
            tracing::info!(
                "no preferred weekday within {} days, nothing to search",
                self.plan.lookahead_days
            );
            return Ok(self.exhausted(stats));
        }

        if let Some(target) = self.plan.release {
            let delay = alignment_delay(now, &target, self.plan.max_alignment_wait);
            if !delay.is_zero() {
                tracing::info!("waiting {}ms for release instant", delay.as_millis());
                tokio::time::sleep(delay).await;
            }
        }

        let budget = SessionBudget::start(self.plan.budget);
        loop {
            if budget.is_exhausted() {
                stats.elapsed_ms = duration_ms(budget.elapsed());
                tracing::info!(
                    "budget of {}s spent after {} pass(es)",
                    self.plan.budget.as_secs(),
                    stats.passes
                );
                return Ok(self.exhausted(stats));
            }

            stats.passes += 1;
            tracing::info!("pass {} ({}ms left)", stats.passes, budget.remaining().as_millis());

            if let Some((slot, date)) = self.pass(&targets, &mut stats).await? {
                stats.elapsed_ms = duration_ms(budget.elapsed());
                self.record(
                    AuditAction::Secured,
                    Some(date),
                    Some(slot.raw_text.clone()),
                );
                tracing::info!(
                    "secured {} on {}, finish manually",
                    slot.time_label(),
                    date
                );
                self.notifier.notify(&CompletionSignal::Secured {
                    date: date.to_string(),
                    time: slot.time_label(),
                    detail: slot.raw_text.clone(),
                });
                return Ok(RunOutcome::Secured { slot, date, stats });
            }

            self.record(
                AuditAction::PassEnded,
                None,
                Some(format!("pass {}", stats.passes)),
            );
            let delay = jittered_delay(self.plan.jitter, &mut self.rng).min(budget.remaining());
            tracing::debug!("sleeping {}ms before next pass", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }

    fn exhausted(&mut self, stats: RunStats) -> RunOutcome {
        self.record(
            AuditAction::Exhausted,
            None,
            Some(format!("{} pass(es)", stats.passes)),
        );
        self.notifier.notify(&CompletionSignal::NothingFound);
        RunOutcome::Exhausted { stats }
    }

    /// One pass over all dates. Per-date failures are absorbed; an expired
    /// session is re-established once per pass and the date retried.
    async fn pass(
        &mut self,
        targets: &[(CandidateDate, String)],
        stats: &mut RunStats,
    ) -> Result<Option<(SlotRecord, CandidateDate)>, RunError> {
        self.ensure_authenticated().await?;
        let mut reauthenticated = false;

        for (date, value) in targets {
            let date = *date;
            let mut result = self.search_and_claim(date, value, stats).await;
            if matches!(result, Err(SurfaceError::AuthExpired)) {
                if reauthenticated {
                    return Err(RunError::Auth(
                        "session expired again after re-authentication".into(),
                    ));
                }
                tracing::warn!("session expired on {}, re-authenticating", date);
                reauthenticated = true;
                self.authenticate().await?;
                result = self.search_and_claim(date, value, stats).await;
            }

            match result {
                Ok(Some(slot)) => return Ok(Some((slot, date))),
                Ok(None) => {}
                Err(SurfaceError::AuthExpired) => {
                    return Err(RunError::Auth(
                        "session expired again after re-authentication".into(),
                    ));
                }
                Err(e) => tracing::warn!("search for {} failed: {}", date, e),
            }
        }
        Ok(None)
    }

    /// Search `date`, then claim its earliest qualifying slot.
    ///
    /// `Ok(None)` covers both an empty result and a failed claim.
    async fn search_and_claim(
        &mut self,
        date: CandidateDate,
        value: &str,
        stats: &mut RunStats,
    ) -> Result<Option<SlotRecord>, SurfaceError> {
        let snapshot = self.search(date, value).await?;
        stats.searches += 1;

        let slots = extract(&snapshot, &self.plan.resource_label, &self.plan.window);
        self.record(
            AuditAction::Search,
            Some(date),
            Some(format!("{} entries, {} qualifying", snapshot.len(), slots.len())),
        );
        let Some(best) = slots.into_iter().next() else {
            tracing::info!("no qualifying slot on {}", date);
            return Ok(None);
        };

        tracing::info!("claiming {} on {}: {}", best.time_label(), date, best.raw_text);
        let report = claim_slot(
            &mut self.surface,
            &best,
            &self.plan.claim,
            &self.plan.signals,
        )
        .await;
        stats.claim_attempts += report.attempts;
        stats.commits += report.commits;
        self.record(
            AuditAction::ClaimAttempt,
            Some(date),
            Some(format!(
                "{} after {} attempt(s): {:?}",
                best.time_label(),
                report.attempts,
                report.outcome
            )),
        );

        if report.outcome == ClaimOutcome::Secured {
            return Ok(Some(best));
        }
        self.record(
            AuditAction::ClaimFailed,
            Some(date),
            Some(best.time_label()),
        );
        if report.session_expired {
            return Err(SurfaceError::AuthExpired);
        }
        Ok(None)
    }

    /// Issue a fresh search for `date` and capture the listing.
    async fn search(
        &mut self,
        date: CandidateDate,
        value: &str,
    ) -> Result<ListingSnapshot, SurfaceError> {
        let search = &self.plan.search;
        self.surface.navigate(&search.url).await?;
        self.surface.fill_field(&search.date_field, value).await?;
        self.surface
            .trigger_affordance(&search.submit, TriggerMode::Commit)
            .await?;
        if !self.surface.wait_settled(search.settle_timeout).await {
            tracing::debug!("results for {} did not settle in time", date);
        }
        self.surface.query_snapshot().await
    }

    async fn ensure_authenticated(&mut self) -> Result<(), RunError> {
        if self.session.is_authenticated(&mut self.surface).await {
            return Ok(());
        }
        tracing::info!("not signed in, authenticating");
        self.authenticate().await
    }

    async fn authenticate(&mut self) -> Result<(), RunError> {
        self.session
            .authenticate(&mut self.surface)
            .await
            .map_err(|e| RunError::Auth(e.to_string()))?;
        if !self.session.is_authenticated(&mut self.surface).await {
            return Err(RunError::Auth("still signed out after authenticating".into()));
        }
        if let Err(e) = self.session.persist(&mut self.surface).await {
            tracing::warn!("failed to persist session: {}", e);
        }
        Ok(())
    }

    fn record(&mut self, action: AuditAction, date: Option<CandidateDate>, detail: Option<String>) {
        if let Some(sink) = self.audit.as_mut() {
            sink.record(build_audit_event(
                self.run_id.clone(),
                action,
                date.map(|d| d.to_string()),
                detail,
            ));
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
