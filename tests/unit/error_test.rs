//! Tests for error types

use slot_sniper::core::{RunError, SurfaceError};

#[test]
fn test_surface_error_display() {
    let err = SurfaceError::NotFound("slot-3".to_string());
    assert_eq!(err.to_string(), "affordance not found: slot-3");

    let err = SurfaceError::Stale("slot-3".to_string());
    assert_eq!(err.to_string(), "stale affordance: slot-3");

    let err = SurfaceError::Timeout("results".to_string());
    assert_eq!(err.to_string(), "surface timed out: results");

    let err = SurfaceError::AuthExpired;
    assert_eq!(err.to_string(), "session expired");

    let err = SurfaceError::Transport("connection reset".to_string());
    assert_eq!(err.to_string(), "transport error: connection reset");
}

#[test]
fn test_auth_expired_detection() {
    assert!(SurfaceError::AuthExpired.is_auth_expired());
    assert!(!SurfaceError::Stale("x".to_string()).is_auth_expired());
}

#[test]
fn test_run_error_display() {
    let err = RunError::Config("missing label".to_string());
    assert_eq!(err.to_string(), "configuration error: missing label");

    let err = RunError::Auth("credentials rejected".to_string());
    assert_eq!(err.to_string(), "authentication failed: credentials rejected");
}

#[test]
fn test_run_error_into_anyhow() {
    let err: anyhow::Error = RunError::Auth("expired twice".to_string()).into();
    assert!(err.to_string().contains("expired twice"));
    assert!(err.downcast_ref::<RunError>().is_some());
}
