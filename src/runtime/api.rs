//! Caller-facing run summary and top-level entry point.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::builders::build_orchestrator;
use crate::config::RunConfig;
use crate::core::{
    AppResult, AutomationSurface, Notifier, RunOutcome, RunStats, SessionProvider, TracingAuditSink,
};

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// A slot is held; finish manually.
    Secured,
    /// Nothing found in the window.
    Exhausted,
}

/// Serializable summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier.
    pub run_id: String,
    /// Final status.
    pub status: RunStatus,
    /// Date of the secured slot, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Time of the secured slot, `HH:MM`.
    pub time: Option<String>,
    /// Resource label of the secured slot.
    pub resource: Option<String>,
    /// Listing text of the secured slot.
    pub detail: Option<String>,
    /// Counters.
    pub stats: RunStats,
}

impl RunReport {
    /// Summarize `outcome`.
    pub fn from_outcome(run_id: impl Into<String>, outcome: &RunOutcome) -> Self {
        match outcome {
            RunOutcome::Secured { slot, date, stats } => Self {
                run_id: run_id.into(),
                status: RunStatus::Secured,
                date: Some(date.to_string()),
                time: Some(slot.time_label()),
                resource: Some(slot.resource_label.clone()),
                detail: Some(slot.raw_text.clone()),
                stats: *stats,
            },
            RunOutcome::Exhausted { stats } => Self {
                run_id: run_id.into(),
                status: RunStatus::Exhausted,
                date: None,
                time: None,
                resource: None,
                detail: None,
                stats: *stats,
            },
        }
    }

    /// Report as a JSON string.
    pub fn to_json(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self).context("serializing run report")
    }
}

/// Load configuration from the environment, install tracing, and run once.
///
/// Configuration and authentication failures come back as errors; running out
/// of budget is a normal `Exhausted` report.
pub async fn run_from_env<S, A, N>(surface: S, session: A, notifier: N) -> AppResult<RunReport>
where
    S: AutomationSurface,
    A: SessionProvider<S>,
    N: Notifier,
{
    crate::util::telemetry::init_tracing();
    let cfg = RunConfig::from_env()
        .map_err(anyhow::Error::msg)
        .context("loading run configuration")?;
    let mut orchestrator = build_orchestrator(&cfg, surface, session, notifier)?
        .with_audit(Box::new(TracingAuditSink));
    let outcome = orchestrator.run().await.context("run aborted")?;
    let report = RunReport::from_outcome(orchestrator.run_id(), &outcome);
    tracing::info!("run {} finished: {:?}", report.run_id, report.status);
    Ok(report)
}
