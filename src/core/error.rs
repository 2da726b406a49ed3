//! Error types for surface interactions and run-level failures.

use thiserror::Error;

/// Failures reported by the external automation surface.
///
/// All of these except [`SurfaceError::AuthExpired`] are transient: the caller
/// retries or moves on to the next date or pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// Referenced element or affordance does not exist.
    #[error("affordance not found: {0}")]
    NotFound(String),
    /// Referenced element went stale or is no longer clickable.
    #[error("stale affordance: {0}")]
    Stale(String),
    /// Interaction did not complete within its timeout.
    #[error("surface timed out: {0}")]
    Timeout(String),
    /// The authenticated session is gone.
    #[error("session expired")]
    AuthExpired,
    /// Transport or rendering failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl SurfaceError {
    /// Whether this failure means the session must be re-established.
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }
}

/// Fatal errors that stop a run.
///
/// Budget exhaustion is not an error; see `RunOutcome::Exhausted`.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
    /// Authentication could not be (re)established.
    #[error("authentication failed: {0}")]
    Auth(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
