//! In-memory scripted surface for dry runs and tests.
//!
//! Listings are registered per date value (the exact text filled into the
//! date field). Each search pops the next listing queued for that date; the
//! last one stays in place. Claims consume a script of [`ClaimResponse`]s.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::{
    AutomationSurface, ElementRef, ListingSnapshot, RunPlan, SurfaceError, TriggerMode,
};

/// How the scripted surface reacts to a committing claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResponse {
    /// Location moves to the accepted destination.
    AcceptByLocation,
    /// Holding marker appears, location unchanged.
    AcceptByMarker,
    /// Surface settles with no success signal.
    Reject,
    /// Like `Reject`, and every affordance is re-rendered under a new handle.
    RejectAndRerender,
    /// Like `Reject`, and the claimed entry disappears from the listing.
    RejectAndRemove,
    /// Surface never settles and shows no success signal.
    Hang,
    /// The committing trigger fails with a stale affordance.
    Stale,
    /// The committing trigger fails because the session expired.
    Expire,
}

/// Interactions observed by the surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceLog {
    /// Locations navigated to.
    pub navigations: Vec<String>,
    /// Values filled into fields.
    pub filled: Vec<(ElementRef, String)>,
    /// Search submissions.
    pub searches: u32,
    /// Claim probes, by handle.
    pub probes: Vec<ElementRef>,
    /// Committing claim actions, by handle, including rejected triggers.
    pub commits: Vec<ElementRef>,
    /// Snapshot queries.
    pub snapshots: u32,
}

/// Scripted in-memory [`AutomationSurface`].
pub struct ScriptedSurface {
    submit: ElementRef,
    accepted_location: String,
    holding_marker: ElementRef,
    listings: HashMap<String, VecDeque<ListingSnapshot>>,
    pending_date: Option<String>,
    current: ListingSnapshot,
    responses: VecDeque<ClaimResponse>,
    default_response: ClaimResponse,
    navigation_errors: VecDeque<SurfaceError>,
    location: String,
    marker_present: bool,
    settled: bool,
    generation: u32,
    log: SurfaceLog,
}

impl ScriptedSurface {
    /// Create a surface. `submit` is the search submit affordance; the other
    /// two are what an accepted claim produces.
    pub fn new(
        submit: ElementRef,
        accepted_location: impl Into<String>,
        holding_marker: ElementRef,
    ) -> Self {
        Self {
            submit,
            accepted_location: accepted_location.into(),
            holding_marker,
            listings: HashMap::new(),
            pending_date: None,
            current: ListingSnapshot::default(),
            responses: VecDeque::new(),
            default_response: ClaimResponse::Reject,
            navigation_errors: VecDeque::new(),
            location: "about:blank".into(),
            marker_present: false,
            settled: true,
            generation: 0,
            log: SurfaceLog::default(),
        }
    }

    /// Create a surface wired to the search and success settings of `plan`.
    pub fn for_plan(plan: &RunPlan) -> Self {
        Self::new(
            plan.search.submit.clone(),
            plan.signals.accepted_location.clone(),
            plan.signals.holding_marker.clone(),
        )
    }

    /// Queue a listing for searches on `date_value`.
    #[must_use]
    pub fn with_listing(mut self, date_value: impl Into<String>, listing: ListingSnapshot) -> Self {
        self.listings
            .entry(date_value.into())
            .or_default()
            .push_back(listing);
        self
    }

    /// Queue claim responses, consumed one per committing claim.
    #[must_use]
    pub fn with_claim_responses(mut self, responses: impl IntoIterator<Item = ClaimResponse>) -> Self {
        self.responses.extend(responses);
        self
    }

    /// Response used once the script is empty.
    #[must_use]
    pub fn with_default_response(mut self, response: ClaimResponse) -> Self {
        self.default_response = response;
        self
    }

    /// Fail the next navigation with `error`.
    #[must_use]
    pub fn fail_next_navigation(mut self, error: SurfaceError) -> Self {
        self.navigation_errors.push_back(error);
        self
    }

    /// Interactions so far.
    pub const fn log(&self) -> &SurfaceLog {
        &self.log
    }

    /// Listing currently displayed.
    pub const fn current_listing(&self) -> &ListingSnapshot {
        &self.current
    }

    fn load_results(&mut self) {
        self.log.searches += 1;
        let listing = self
            .pending_date
            .as_ref()
            .and_then(|date| self.listings.get_mut(date))
            .and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            });
        self.current = listing.unwrap_or_default();
        self.settled = true;
    }

    fn holds_affordance(&self, target: &ElementRef) -> bool {
        self.current
            .entries
            .iter()
            .any(|entry| entry.affordance.as_ref() == Some(target))
    }

    fn rerender(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        for entry in &mut self.current.entries {
            if let Some(handle) = entry.affordance.as_mut() {
                let base = handle.as_str().split('~').next().unwrap_or_default().to_string();
                *handle = ElementRef::new(format!("{base}~{generation}"));
            }
        }
    }

    fn commit_claim(&mut self, target: &ElementRef) -> Result<(), SurfaceError> {
        self.log.commits.push(target.clone());
        let response = self.responses.pop_front().unwrap_or(self.default_response);
        tracing::debug!("scripted claim on {} -> {:?}", target, response);
        match response {
            ClaimResponse::AcceptByLocation => {
                self.location = self.accepted_location.clone();
                self.settled = true;
            }
            ClaimResponse::AcceptByMarker => {
                self.marker_present = true;
                self.settled = true;
            }
            ClaimResponse::Reject => self.settled = true,
            ClaimResponse::RejectAndRerender => {
                self.rerender();
                self.settled = true;
            }
            ClaimResponse::RejectAndRemove => {
                self.current
                    .entries
                    .retain(|entry| entry.affordance.as_ref() != Some(target));
                self.settled = true;
            }
            ClaimResponse::Hang => self.settled = false,
            ClaimResponse::Stale => {
                return Err(SurfaceError::Stale(target.to_string()));
            }
            ClaimResponse::Expire => return Err(SurfaceError::AuthExpired),
        }
        Ok(())
    }
}

#[async_trait]
impl AutomationSurface for ScriptedSurface {
    async fn navigate(&mut self, url: &str) -> Result<(), SurfaceError> {
        if let Some(error) = self.navigation_errors.pop_front() {
            return Err(error);
        }
        self.log.navigations.push(url.to_string());
        self.location = url.to_string();
        self.marker_present = false;
        self.settled = true;
        Ok(())
    }

    async fn fill_field(&mut self, field: &ElementRef, value: &str) -> Result<(), SurfaceError> {
        self.log.filled.push((field.clone(), value.to_string()));
        self.pending_date = Some(value.to_string());
        Ok(())
    }

    async fn trigger_affordance(
        &mut self,
        target: &ElementRef,
        mode: TriggerMode,
    ) -> Result<(), SurfaceError> {
        if *target == self.submit {
            if mode == TriggerMode::Commit {
                self.load_results();
            }
            return Ok(());
        }
        if !self.holds_affordance(target) {
            return Err(SurfaceError::Stale(target.to_string()));
        }
        match mode {
            TriggerMode::Probe => {
                self.log.probes.push(target.clone());
                Ok(())
            }
            TriggerMode::Commit => self.commit_claim(target),
        }
    }

    async fn query_snapshot(&mut self) -> Result<ListingSnapshot, SurfaceError> {
        self.log.snapshots += 1;
        Ok(self.current.clone())
    }

    async fn wait_settled(&mut self, timeout: Duration) -> bool {
        if self.settled {
            return true;
        }
        tokio::time::sleep(timeout).await;
        false
    }

    async fn current_location(&mut self) -> String {
        self.location.clone()
    }

    async fn is_present(&mut self, target: &ElementRef) -> bool {
        self.marker_present && *target == self.holding_marker
    }
}
