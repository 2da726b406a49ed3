//! Builds an orchestrator from a validated run configuration.

use crate::config::RunConfig;
use crate::core::{AutomationSurface, Notifier, Orchestrator, RunError, SessionProvider};

/// Validate `cfg` and assemble an orchestrator around the given collaborators.
///
/// Configuration problems surface here, before any external interaction.
pub fn build_orchestrator<S, A, N>(
    cfg: &RunConfig,
    surface: S,
    session: A,
    notifier: N,
) -> Result<Orchestrator<S, A, N>, RunError>
where
    S: AutomationSurface,
    A: SessionProvider<S>,
    N: Notifier,
{
    let plan = cfg
        .resolve()
        .map_err(|e| RunError::Config(format!("config invalid: {e}")))?;
    tracing::debug!(
        "built plan for `{}` window {} tz {}",
        plan.resource_label,
        plan.window,
        plan.tz
    );
    Ok(Orchestrator::new(plan, surface, session, notifier))
}
