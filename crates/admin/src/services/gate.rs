//! Shared-password gate in front of the product admin.
//!
//! The gate is a deterrent for casual visitors, not authentication: one
//! configured password, plain string comparison, and a single per-session
//! flag that is never cleared once set. There is no logout, lockout, or
//! rate limiting.
//!
//! ```text
//! Locked --attempt_login(match)--> Unlocked
//! ```

use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tower_sessions::Session;

use crate::models::session::UNLOCKED_MARKER;
use crate::models::session_keys;

/// Failure reading or writing the persisted flag.
#[derive(Debug, Error)]
#[error("session flag store error: {0}")]
pub struct FlagStoreError(String);

impl From<tower_sessions::session::Error> for FlagStoreError {
    fn from(e: tower_sessions::session::Error) -> Self {
        Self(e.to_string())
    }
}

/// Errors from [`SessionGate::attempt_login`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// Candidate did not match the configured password.
    #[error("Incorrect Password")]
    WrongPassword,

    /// The flag could not be persisted.
    #[error(transparent)]
    FlagStore(#[from] FlagStoreError),
}

/// Gate state. `Unlocked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Locked,
    Unlocked,
}

/// Persistent slot holding the unlock flag.
#[async_trait]
pub trait SessionFlagStore: Send + Sync {
    /// Read the raw stored value, if any.
    async fn get(&self) -> Result<Option<String>, FlagStoreError>;

    /// Overwrite the stored value.
    async fn set(&self, value: &str) -> Result<(), FlagStoreError>;
}

/// Flag slot kept in the operator's tower-sessions session (cookie-keyed).
#[derive(Clone)]
pub struct SessionSlot {
    session: Session,
}

impl SessionSlot {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl SessionFlagStore for SessionSlot {
    async fn get(&self) -> Result<Option<String>, FlagStoreError> {
        // A non-string value is treated as absent so it reads as Locked.
        let value = self.session.get_value(session_keys::ADMIN_AUTH).await?;
        Ok(value.and_then(|v| v.as_str().map(ToOwned::to_owned)))
    }

    async fn set(&self, value: &str) -> Result<(), FlagStoreError> {
        self.session
            .insert(session_keys::ADMIN_AUTH, value)
            .await?;
        Ok(())
    }
}

/// In-process flag slot.
#[derive(Debug, Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    /// A slot that already holds `value`.
    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }

    /// Current raw value.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        self.value
            .lock()
            .map(|v| v.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl SessionFlagStore for MemorySlot {
    async fn get(&self) -> Result<Option<String>, FlagStoreError> {
        Ok(self.value())
    }

    async fn set(&self, value: &str) -> Result<(), FlagStoreError> {
        let mut slot = self
            .value
            .lock()
            .map_err(|_| FlagStoreError("memory slot poisoned".to_string()))?;
        *slot = Some(value.to_owned());
        Ok(())
    }
}

/// Decides whether a login candidate is the secret.
pub trait SecretCheck: Send + Sync {
    fn matches(&self, candidate: &str) -> bool;
}

/// The configured gate password.
///
/// Comparison is exact: case-sensitive, no trimming, no hashing.
#[derive(Clone)]
pub struct GateSecret(SecretString);

impl GateSecret {
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self(secret)
    }
}

impl std::fmt::Debug for GateSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GateSecret([REDACTED])")
    }
}

impl SecretCheck for GateSecret {
    fn matches(&self, candidate: &str) -> bool {
        self.0.expose_secret() == candidate
    }
}

impl<F> SecretCheck for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn matches(&self, candidate: &str) -> bool {
        self(candidate)
    }
}

/// Whether the slot holds exactly the unlock marker.
///
/// # Errors
///
/// Returns an error if the slot cannot be read.
pub async fn check_persisted_session(
    slot: &(impl SessionFlagStore + ?Sized),
) -> Result<bool, FlagStoreError> {
    Ok(slot.get().await?.as_deref() == Some(UNLOCKED_MARKER))
}

/// The gate as mounted for one request or page view.
pub struct SessionGate<'a, C: SecretCheck + ?Sized, S: SessionFlagStore + ?Sized> {
    secret: &'a C,
    slot: &'a S,
    state: GateState,
}

impl<'a, C, S> SessionGate<'a, C, S>
where
    C: SecretCheck + ?Sized,
    S: SessionFlagStore + ?Sized,
{
    /// Mount the gate: `Unlocked` iff the persisted flag is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    pub async fn mount(secret: &'a C, slot: &'a S) -> Result<Self, FlagStoreError> {
        let state = if check_persisted_session(slot).await? {
            GateState::Unlocked
        } else {
            GateState::Locked
        };
        Ok(Self {
            secret,
            slot,
            state,
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GateState {
        self.state
    }

    /// Whether the gate has been passed.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.state == GateState::Unlocked
    }

    /// Compare `candidate` to the secret; on a match unlock and persist the flag.
    ///
    /// A mismatch never changes state, so an unlocked gate stays unlocked.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::WrongPassword`] on mismatch, or
    /// [`AuthError::FlagStore`] if the flag cannot be written.
    pub async fn attempt_login(&mut self, candidate: &str) -> Result<(), AuthError> {
        if !self.secret.matches(candidate) {
            tracing::info!("Gate login rejected");
            return Err(AuthError::WrongPassword);
        }

        self.slot.set(UNLOCKED_MARKER).await?;
        self.state = GateState::Unlocked;
        tracing::info!("Gate unlocked");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> GateSecret {
        GateSecret::new(SecretString::from("ashvi@77"))
    }

    #[tokio::test]
    async fn test_empty_slot_mounts_locked() {
        let slot = MemorySlot::default();
        let secret = secret();
        let gate = SessionGate::mount(&secret, &slot).await.unwrap();
        assert_eq!(gate.state(), GateState::Locked);
    }

    #[tokio::test]
    async fn test_marker_mounts_unlocked() {
        let slot = MemorySlot::with_value("true");
        let secret = secret();
        let gate = SessionGate::mount(&secret, &slot).await.unwrap();
        assert_eq!(gate.state(), GateState::Unlocked);
    }

    #[tokio::test]
    async fn test_other_values_mount_locked() {
        let secret = secret();
        for value in ["TRUE", "True", "1", "yes", " true", "true ", ""] {
            let slot = MemorySlot::with_value(value);
            let gate = SessionGate::mount(&secret, &slot).await.unwrap();
            assert_eq!(gate.state(), GateState::Locked, "value {value:?}");
        }
    }

    #[tokio::test]
    async fn test_correct_password_unlocks_and_persists() {
        let slot = MemorySlot::default();
        let secret = secret();
        let mut gate = SessionGate::mount(&secret, &slot).await.unwrap();

        gate.attempt_login("ashvi@77").await.unwrap();

        assert!(gate.is_unlocked());
        assert_eq!(slot.value().as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_comparison_is_exact() {
        let secret = secret();
        for candidate in ["wrong", "ASHVI@77", " ashvi@77", "ashvi@77 ", "ashvi@7", ""] {
            let slot = MemorySlot::default();
            let mut gate = SessionGate::mount(&secret, &slot).await.unwrap();
            let err = gate.attempt_login(candidate).await.unwrap_err();
            assert!(matches!(err, AuthError::WrongPassword));
            assert_eq!(gate.state(), GateState::Locked);
            assert_eq!(slot.value(), None);
        }
    }

    #[tokio::test]
    async fn test_wrong_password_does_not_relock() {
        let slot = MemorySlot::with_value("true");
        let secret = secret();
        let mut gate = SessionGate::mount(&secret, &slot).await.unwrap();

        assert!(gate.attempt_login("nope").await.is_err());
        assert!(gate.is_unlocked());
        assert_eq!(slot.value().as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_closure_secret_check() {
        let slot = MemorySlot::default();
        let check = |candidate: &str| candidate == "open sesame";
        let mut gate = SessionGate::mount(&check, &slot).await.unwrap();
        gate.attempt_login("open sesame").await.unwrap();
        assert!(gate.is_unlocked());
    }

    fn session_slot() -> SessionSlot {
        let store = std::sync::Arc::new(tower_sessions::MemoryStore::default());
        SessionSlot::new(Session::new(None, store, None))
    }

    #[tokio::test]
    async fn test_session_slot_round_trips_marker() {
        let slot = session_slot();
        assert_eq!(slot.get().await.unwrap(), None);

        slot.set("true").await.unwrap();
        assert_eq!(slot.get().await.unwrap().as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_session_slot_non_string_value_mounts_locked() {
        let secret = secret();
        for value in [
            serde_json::json!(true),
            serde_json::json!(1),
            serde_json::json!({"adminAuth": "true"}),
            serde_json::Value::Null,
        ] {
            let slot = session_slot();
            slot.session
                .insert(session_keys::ADMIN_AUTH, &value)
                .await
                .unwrap();

            assert_eq!(slot.get().await.unwrap(), None, "value {value}");
            let gate = SessionGate::mount(&secret, &slot).await.unwrap();
            assert_eq!(gate.state(), GateState::Locked, "value {value}");
        }
    }

    #[test]
    fn test_gate_secret_debug_redacts() {
        assert!(!format!("{:?}", secret()).contains("ashvi"));
    }
}
