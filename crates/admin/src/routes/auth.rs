//! Gate route handlers.
//!
//! A single password form. There is no logout: once a session is unlocked it
//! stays unlocked for the life of the session cookie.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::routes::alert_page;
use crate::services::{AuthError, SessionGate, SessionSlot};
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate;

/// Login form payload.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/auth/login", get(login_page).post(login))
}

/// Render the login page, or skip it if the gate is already open.
///
/// GET /auth/login
#[instrument(skip(state, session))]
async fn login_page(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let slot = SessionSlot::new(session);
    let gate = SessionGate::mount(state.gate_secret(), &slot).await?;
    if gate.is_unlocked() {
        return Ok(Redirect::to("/products").into_response());
    }

    Ok(Html(LoginPageTemplate.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response())
}

/// Check the submitted password.
///
/// POST /auth/login
#[instrument(skip(state, session, form))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let slot = SessionSlot::new(session);
    let mut gate = SessionGate::mount(state.gate_secret(), &slot).await?;

    match gate.attempt_login(&form.password).await {
        Ok(()) => Ok(Redirect::to("/products").into_response()),
        Err(AuthError::WrongPassword) => Ok(alert_page(
            StatusCode::UNAUTHORIZED,
            &AuthError::WrongPassword.to_string(),
            "/auth/login",
        )),
        Err(AuthError::FlagStore(e)) => Err(e.into()),
    }
}
