//! Race-safe claim protocol.
//!
//! A claim moves `Idle -> Attempting -> Verifying` and lands on `Secured`,
//! `LostRace` or `Inconclusive`. Anything but `Secured` is retried after a short
//! fixed pause until the retry bound is spent, at which point the slot is
//! `Failed` for this pass. Losing a race is an expected outcome and never
//! surfaces as an error.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::extract::SlotRecord;
use super::surface::{AutomationSurface, ElementRef, TriggerMode};
use super::SurfaceError;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default pause between attempts.
pub const DEFAULT_RETRY_PAUSE: Duration = Duration::from_millis(150);

/// Default settle timeout after the committing action.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// States of a single claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimState {
    /// Nothing issued yet.
    Idle,
    /// Probing and committing.
    Attempting,
    /// Waiting for the surface and reading success signals.
    Verifying,
    /// Slot held.
    Secured,
    /// No success signal after the surface settled.
    LostRace,
    /// No success signal and the surface never settled.
    Inconclusive,
    /// Retry bound exhausted.
    Failed,
}

/// Outcome of one attempt, or of the whole claim once retries are spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// Slot held pending manual confirmation.
    Secured,
    /// Another actor took the slot.
    LostRace,
    /// Neither confirmed nor refuted before the settle timeout.
    Inconclusive,
    /// Unobtainable this pass.
    Failed,
}

impl From<ClaimOutcome> for ClaimState {
    fn from(outcome: ClaimOutcome) -> Self {
        match outcome {
            ClaimOutcome::Secured => Self::Secured,
            ClaimOutcome::LostRace => Self::LostRace,
            ClaimOutcome::Inconclusive => Self::Inconclusive,
            ClaimOutcome::Failed => Self::Failed,
        }
    }
}

/// Retry and timing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Fixed pause between attempts.
    pub retry_pause: Duration,
    /// Bound on waiting for the surface to settle after committing.
    pub settle_timeout: Duration,
}

impl Default for ClaimPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_pause: DEFAULT_RETRY_PAUSE,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
        }
    }
}

/// The two independent success signals. Either one confirms a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessSignals {
    /// Fragment of the location reached after an accepted claim.
    pub accepted_location: String,
    /// Element present once a slot sits in the holding area.
    pub holding_marker: ElementRef,
}

/// Result of a whole claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReport {
    /// `Secured` or `Failed`.
    pub outcome: ClaimOutcome,
    /// Attempts made, including the first.
    pub attempts: u32,
    /// Committing actions the surface accepted.
    pub commits: u32,
    /// Verdict of the last attempt, `None` if it failed before verifying.
    pub last_verdict: Option<ClaimOutcome>,
    /// The surface reported an expired session; the caller must
    /// re-authenticate before trying again.
    pub session_expired: bool,
}

/// Drives one claim against a surface.
///
/// Holds no state across claims beyond the attempt counter.
pub struct ClaimMachine<'a> {
    policy: &'a ClaimPolicy,
    signals: &'a SuccessSignals,
    state: ClaimState,
    attempts: u32,
    commits: u32,
}

impl<'a> ClaimMachine<'a> {
    /// Create an idle machine.
    pub const fn new(policy: &'a ClaimPolicy, signals: &'a SuccessSignals) -> Self {
        Self {
            policy,
            signals,
            state: ClaimState::Idle,
            attempts: 0,
            commits: 0,
        }
    }

    /// Current state.
    pub const fn state(&self) -> ClaimState {
        self.state
    }

    fn transition(&mut self, next: ClaimState) {
        tracing::debug!("claim {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Claim `slot`, retrying up to the policy bound.
    ///
    /// An expired session ends the claim at once with `session_expired` set;
    /// retrying against a dead session cannot succeed.
    pub async fn claim<S>(&mut self, surface: &mut S, slot: &SlotRecord) -> ClaimReport
    where
        S: AutomationSurface + ?Sized,
    {
        loop {
            self.attempts += 1;
            self.transition(ClaimState::Attempting);

            let last_verdict = match self.attempt(surface, slot).await {
                Ok(ClaimOutcome::Secured) => {
                    tracing::info!(
                        "secured {} after {} attempt(s)",
                        slot.time_label(),
                        self.attempts
                    );
                    return self.finish(ClaimOutcome::Secured, Some(ClaimOutcome::Secured), false);
                }
                Ok(verdict) => {
                    self.transition(verdict.into());
                    tracing::info!(
                        "attempt {} on {}: {:?}",
                        self.attempts,
                        slot.time_label(),
                        verdict
                    );
                    Some(verdict)
                }
                Err(e) if e.is_auth_expired() => {
                    tracing::warn!(
                        "session expired during attempt {} on {}",
                        self.attempts,
                        slot.time_label()
                    );
                    return self.finish(ClaimOutcome::Failed, None, true);
                }
                Err(e) => {
                    tracing::warn!(
                        "attempt {} on {} failed: {}",
                        self.attempts,
                        slot.time_label(),
                        e
                    );
                    None
                }
            };

            if self.attempts > self.policy.max_retries {
                tracing::warn!(
                    "giving up on {} after {} attempts",
                    slot.time_label(),
                    self.attempts
                );
                return self.finish(ClaimOutcome::Failed, last_verdict, false);
            }
            tokio::time::sleep(self.policy.retry_pause).await;
        }
    }

    fn finish(
        &mut self,
        outcome: ClaimOutcome,
        last_verdict: Option<ClaimOutcome>,
        session_expired: bool,
    ) -> ClaimReport {
        self.transition(outcome.into());
        ClaimReport {
            outcome,
            attempts: self.attempts,
            commits: self.commits,
            last_verdict,
            session_expired,
        }
    }

    /// One probe, commit and verify cycle.
    async fn attempt<S>(
        &mut self,
        surface: &mut S,
        slot: &SlotRecord,
    ) -> Result<ClaimOutcome, SurfaceError>
    where
        S: AutomationSurface + ?Sized,
    {
        let handle = if self.attempts == 1 {
            slot.claim_handle.clone()
        } else {
            let snapshot = surface.query_snapshot().await?;
            slot.relocate(&snapshot).ok_or_else(|| {
                SurfaceError::NotFound(format!("slot {} no longer listed", slot.time_label()))
            })?
        };

        if let Err(e) = surface.trigger_affordance(&handle, TriggerMode::Probe).await {
            tracing::debug!("probe on {} failed, committing anyway: {}", handle, e);
        }

        surface
            .trigger_affordance(&handle, TriggerMode::Commit)
            .await?;
        self.commits += 1;

        self.transition(ClaimState::Verifying);
        let settled = surface.wait_settled(self.policy.settle_timeout).await;
        Ok(self.verify(surface, settled).await)
    }

    async fn verify<S>(&self, surface: &mut S, settled: bool) -> ClaimOutcome
    where
        S: AutomationSurface + ?Sized,
    {
        let location = surface.current_location().await;
        let at_accepted = !self.signals.accepted_location.is_empty()
            && location.contains(&self.signals.accepted_location);
        let marker = surface.is_present(&self.signals.holding_marker).await;
        tracing::debug!(
            "verify: location={} accepted={} marker={} settled={}",
            location,
            at_accepted,
            marker,
            settled
        );

        if at_accepted || marker {
            ClaimOutcome::Secured
        } else if settled {
            ClaimOutcome::LostRace
        } else {
            ClaimOutcome::Inconclusive
        }
    }
}

/// Claim `slot` with a fresh machine.
pub async fn claim_slot<S>(
    surface: &mut S,
    slot: &SlotRecord,
    policy: &ClaimPolicy,
    signals: &SuccessSignals,
) -> ClaimReport
where
    S: AutomationSurface + ?Sized,
{
    ClaimMachine::new(policy, signals).claim(surface, slot).await
}
