//! Integration tests for the password gate.
//!
//! These run against the in-memory flag slot, so they exercise the gate's
//! state machine without any HTTP plumbing.

use secrecy::SecretString;

use boutique_admin::services::{
    AuthError, GateSecret, GateState, MemorySlot, SessionGate, check_persisted_session,
};

fn secret() -> GateSecret {
    GateSecret::new(SecretString::from("ashvi@77"))
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_correct_password_unlocks() {
    let slot = MemorySlot::default();
    let secret = secret();
    let mut gate = SessionGate::mount(&secret, &slot).await.unwrap();

    gate.attempt_login("ashvi@77").await.unwrap();

    assert_eq!(gate.state(), GateState::Unlocked);
    assert!(check_persisted_session(&slot).await.unwrap());
}

#[tokio::test]
async fn test_wrong_password_stays_locked() {
    let slot = MemorySlot::default();
    let secret = secret();
    let mut gate = SessionGate::mount(&secret, &slot).await.unwrap();

    let err = gate.attempt_login("wrong").await.unwrap_err();

    assert!(matches!(err, AuthError::WrongPassword));
    assert_eq!(err.to_string(), "Incorrect Password");
    assert_eq!(gate.state(), GateState::Locked);
    assert!(!check_persisted_session(&slot).await.unwrap());
}

#[tokio::test]
async fn test_retry_after_wrong_password() {
    let slot = MemorySlot::default();
    let secret = secret();
    let mut gate = SessionGate::mount(&secret, &slot).await.unwrap();

    assert!(gate.attempt_login("ashvi").await.is_err());
    assert!(gate.attempt_login("ashvi@77").await.is_ok());
    assert!(gate.is_unlocked());
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_unlock_survives_remount() {
    let slot = MemorySlot::default();
    let secret = secret();
    {
        let mut gate = SessionGate::mount(&secret, &slot).await.unwrap();
        gate.attempt_login("ashvi@77").await.unwrap();
    }

    // A reload mounts a fresh gate over the same slot
    let gate = SessionGate::mount(&secret, &slot).await.unwrap();
    assert_eq!(gate.state(), GateState::Unlocked);
}

#[tokio::test]
async fn test_only_exact_marker_unlocks_on_mount() {
    let secret = secret();
    for (value, expected) in [
        ("true", GateState::Unlocked),
        ("false", GateState::Locked),
        ("True", GateState::Locked),
        ("1", GateState::Locked),
    ] {
        let slot = MemorySlot::with_value(value);
        let gate = SessionGate::mount(&secret, &slot).await.unwrap();
        assert_eq!(gate.state(), expected, "stored value {value:?}");
    }
}
