//! Product route handlers.
//!
//! The page is a server-rendered add form plus the live product grid. The grid
//! is always rendered from the [`ProductFeed`](crate::services::ProductFeed)
//! mirror; a create or delete only shows up once the store pushes the next
//! snapshot.

use std::convert::Infallible;
use std::sync::Arc;

use askama::Template;
use async_stream::stream;
use axum::response::sse::{Event, KeepAlive};
use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response, Sse},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use boutique_core::{Product, ProductId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireUnlocked;
use crate::models::DraftProduct;
use crate::routes::alert_page;
use crate::services::{
    CreateError, DELETE_PROMPT, DeleteOutcome, FeedState, FeedStatus, StoreError,
};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/grid", get(grid))
        .route("/products/feed", get(feed))
        .route(
            "/products/{id}/delete",
            get(confirm_delete).post(delete),
        )
}

// =============================================================================
// Views
// =============================================================================

/// Grid view for templates.
#[derive(Debug, Clone)]
pub struct GridView {
    pub products: Arc<Vec<Product>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl From<&FeedState> for GridView {
    fn from(state: &FeedState) -> Self {
        Self {
            products: state.products.clone(),
            loading: state.status.is_loading(),
            error: state.status.error().map(ToOwned::to_owned),
        }
    }
}

/// Products page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub draft: DraftProduct,
    pub error: Option<String>,
    pub busy: bool,
    pub grid: GridView,
}

/// Grid fragment template (refreshed by the page script on every snapshot).
#[derive(Template)]
#[template(path = "products/_grid.html")]
pub struct ProductsGridTemplate {
    pub grid: GridView,
}

/// Delete confirmation page template.
#[derive(Template)]
#[template(path = "products/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub product: Product,
    pub prompt: &'static str,
}

fn render_index(
    state: &AppState,
    draft: DraftProduct,
    error: Option<String>,
) -> Html<String> {
    let template = ProductsIndexTemplate {
        draft,
        error,
        busy: state.gateway().is_busy(),
        grid: GridView::from(&state.feed().current()),
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

// =============================================================================
// Handlers
// =============================================================================

/// Products page: add form and grid.
///
/// GET /products
#[instrument(skip(_gate, state))]
async fn index(_gate: RequireUnlocked, State(state): State<AppState>) -> Html<String> {
    render_index(&state, DraftProduct::default(), None)
}

/// Create a product from the submitted draft.
///
/// POST /products
///
/// On success redirects back to the page (the form comes back empty). On
/// failure the page is rendered again with the draft as submitted.
#[instrument(skip(_gate, state, draft))]
async fn create(
    _gate: RequireUnlocked,
    State(state): State<AppState>,
    Form(mut draft): Form<DraftProduct>,
) -> Response {
    let error = match state.gateway().create_product(&mut draft).await {
        Ok(_) => return Redirect::to("/products").into_response(),
        Err(e) => e,
    };

    let status = match &error {
        CreateError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CreateError::Busy => StatusCode::CONFLICT,
        CreateError::Store(StoreError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        CreateError::Store(StoreError::Repository(_)) => StatusCode::BAD_GATEWAY,
    };

    (status, render_index(&state, draft, Some(error.to_string()))).into_response()
}

/// Grid fragment.
///
/// GET /products/grid
async fn grid(_gate: RequireUnlocked, State(state): State<AppState>) -> Html<String> {
    let template = ProductsGridTemplate {
        grid: GridView::from(&state.feed().current()),
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Live snapshots as server-sent events.
///
/// GET /products/feed
///
/// Sends the current state immediately, then one `snapshot` event per store
/// change or status change. Events carry the full collection.
async fn feed(
    _gate: RequireUnlocked,
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.feed().watch();

    let events = stream! {
        loop {
            let current = rx.borrow_and_update().clone();
            let json = serde_json::to_string(&current).unwrap_or_else(|_| {
                r#"{"status":{"state":"failed","message":"Failed to serialize snapshot"},"products":[]}"#
                    .to_string()
            });
            yield Ok::<_, Infallible>(Event::default().event("snapshot").data(json));

            if matches!(current.status, FeedStatus::Failed(_)) || rx.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Delete confirmation prompt (used when the page script is not running).
///
/// GET /products/{id}/delete
#[instrument(skip(_gate, state))]
async fn confirm_delete(
    _gate: RequireUnlocked,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let product = state
        .feed()
        .current()
        .products
        .iter()
        .find(|p| p.id.as_str() == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let template = ConfirmDeleteTemplate {
        product,
        prompt: DELETE_PROMPT,
    };

    Ok(Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    })))
}

/// Delete form payload. Only `confirm=yes` counts as an affirmative answer.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

/// Delete a product.
///
/// POST /products/{id}/delete
///
/// A declined confirmation is a no-op. A store failure is shown as a blocking
/// alert; the grid is left as it is until the next snapshot.
#[instrument(skip(_gate, state, form))]
async fn delete(
    _gate: RequireUnlocked,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Response {
    let confirmed = form.confirm.as_deref() == Some("yes");
    let id = ProductId::new(id);

    match state.gateway().delete_product(&id, confirmed).await {
        Ok(DeleteOutcome::Deleted | DeleteOutcome::Declined) => {
            Redirect::to("/products").into_response()
        }
        Err(e) => {
            let status = match e {
                StoreError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                StoreError::Repository(_) => StatusCode::BAD_GATEWAY,
            };
            alert_page(status, "Failed to delete product.", "/products")
        }
    }
}
