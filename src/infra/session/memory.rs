//! In-memory session provider.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{AutomationSurface, SessionProvider, SurfaceError};

/// Session provider backed by a flag.
///
/// Clones share state, so a caller can keep a handle to inspect sign-ins or
/// expire the session while the orchestrator owns another clone.
#[derive(Debug, Clone)]
pub struct StaticSession {
    signed_in: Arc<AtomicBool>,
    accepts_credentials: Arc<AtomicBool>,
    sign_ins: Arc<AtomicU32>,
}

impl StaticSession {
    /// Session that starts signed in.
    pub fn signed_in() -> Self {
        Self::with_state(true, true)
    }

    /// Session that starts signed out and accepts credentials.
    pub fn signed_out() -> Self {
        Self::with_state(false, true)
    }

    /// Session whose credentials are always rejected.
    pub fn rejecting() -> Self {
        Self::with_state(false, false)
    }

    fn with_state(signed_in: bool, accepts_credentials: bool) -> Self {
        Self {
            signed_in: Arc::new(AtomicBool::new(signed_in)),
            accepts_credentials: Arc::new(AtomicBool::new(accepts_credentials)),
            sign_ins: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Drop the session.
    pub fn expire(&self) {
        self.signed_in.store(false, Ordering::Release);
    }

    /// Successful sign-ins so far.
    pub fn sign_ins(&self) -> u32 {
        self.sign_ins.load(Ordering::Acquire)
    }
}

#[async_trait]
impl<S: AutomationSurface> SessionProvider<S> for StaticSession {
    async fn is_authenticated(&mut self, _surface: &mut S) -> bool {
        self.signed_in.load(Ordering::Acquire)
    }

    async fn authenticate(&mut self, _surface: &mut S) -> Result<(), SurfaceError> {
        if !self.accepts_credentials.load(Ordering::Acquire) {
            return Err(SurfaceError::Transport("credentials rejected".into()));
        }
        self.signed_in.store(true, Ordering::Release);
        self.sign_ins.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
