//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store reachable)
//!
//! # Gate
//! GET  /auth/login             - Password form
//! POST /auth/login             - Check password, unlock session
//!
//! # Products (gate required)
//! GET  /                       - Redirect to /products
//! GET  /products               - Add form and live grid
//! POST /products               - Create product from draft
//! GET  /products/grid          - Grid fragment
//! GET  /products/feed          - Snapshot events (SSE)
//! GET  /products/{id}/delete   - Delete confirmation prompt
//! POST /products/{id}/delete   - Delete (confirm=yes) or decline
//!
//! # API (gate required, 401 when locked)
//! GET  /api/products           - Current snapshot and status as JSON
//! ```

pub mod api;
pub mod auth;
pub mod products;

use askama::Template;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::filters;
use crate::middleware::security_headers_middleware;
use crate::state::AppState;

/// Blocking alert page: one message and a way back.
#[derive(Template)]
#[template(path = "alert.html")]
struct AlertTemplate<'a> {
    message: &'a str,
    back: &'a str,
}

/// Render a blocking alert with the given status.
pub(crate) fn alert_page(status: StatusCode, message: &str, back: &str) -> Response {
    let html = AlertTemplate { message, back }
        .render()
        .unwrap_or_else(|e| {
            tracing::error!("Template render error: {}", e);
            "Internal Server Error".to_string()
        });
    (status, Html(html)).into_response()
}

/// Build the routes that need application state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth::router())
        .merge(products::router())
        .merge(api::router())
}

/// Build the full application: routes, static files, sessions, security
/// headers, and request tracing.
///
/// Sentry layers are added by the binary.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .merge(routes())
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .layer(session_layer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the product store answers within the store timeout.
/// Returns 503 Service Unavailable otherwise.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let timeout = state.config().store_timeout;
    match tokio::time::timeout(timeout, state.store().list()).await {
        Ok(Ok(_)) => StatusCode::OK,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            tracing::warn!("Readiness check timed out");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
