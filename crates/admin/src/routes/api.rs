//! JSON API for the product admin.

use axum::{Json, Router, extract::State, routing::get};

use crate::middleware::RequireUnlocked;
use crate::services::FeedState;
use crate::state::AppState;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/products", get(products))
}

/// Current snapshot and feed status.
///
/// GET /api/products
async fn products(_gate: RequireUnlocked, State(state): State<AppState>) -> Json<FeedState> {
    Json(state.feed().current())
}
