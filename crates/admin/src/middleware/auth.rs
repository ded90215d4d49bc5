//! Gate extractors for admin.
//!
//! Every product route takes [`RequireUnlocked`]; only the login page and the
//! health checks are reachable while the gate is locked.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::services::{SessionSlot, check_persisted_session};

/// Path of the login page.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires the gate to be unlocked for this session.
///
/// If the gate is locked, returns a redirect to the login page for HTML
/// requests, or 401 Unauthorized for API and event-stream requests.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUnlocked(session): RequireUnlocked) -> impl IntoResponse {
///     "unlocked"
/// }
/// ```
pub struct RequireUnlocked(pub Session);

/// Error returned when the gate is still locked.
#[derive(Debug)]
pub enum GateRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The session layer is missing or the session could not be read.
    SessionUnavailable,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::SessionUnavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable").into_response()
            }
        }
    }
}

/// Whether a locked request should get a 401 rather than a redirect.
fn is_machine_request(path: &str) -> bool {
    path.starts_with("/api/") || path == "/products/feed" || path == "/products/grid"
}

impl<S> FromRequestParts<S> for RequireUnlocked
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(GateRejection::SessionUnavailable)?;

        let unlocked = check_persisted_session(&SessionSlot::new(session.clone()))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to read gate flag");
                GateRejection::SessionUnavailable
            })?;

        if unlocked {
            return Ok(Self(session));
        }

        if is_machine_request(parts.uri.path()) {
            Err(GateRejection::Unauthorized)
        } else {
            Err(GateRejection::RedirectToLogin)
        }
    }
}
