//! Live product binding.
//!
//! Mirrors the store's product collection into local state. Every store
//! change arrives as a full snapshot which replaces the local copy outright;
//! nothing is merged and nothing is inserted optimistically.

use std::sync::{Arc, Mutex, PoisonError};

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use boutique_core::Product;

use crate::db::ProductStore;

/// Subscription status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum FeedStatus {
    /// No snapshot received yet.
    Loading,
    /// At least one snapshot received.
    Ready,
    /// The subscription failed; no further snapshots will arrive.
    Failed(String),
}

impl FeedStatus {
    /// `true` only until the first snapshot (or failure).
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Failure message, if the subscription failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Handle that ends a subscription.
///
/// Consuming [`Unsubscribe::unsubscribe`] stops delivery permanently; dropping
/// the handle has the same effect, so the subscription cannot outlive it.
#[must_use = "dropping the handle ends the subscription"]
pub struct Unsubscribe {
    task: Option<JoinHandle<()>>,
    status: watch::Receiver<FeedStatus>,
}

impl Unsubscribe {
    /// Stop delivery and release the store subscription.
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    /// Status of the subscription.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<FeedStatus> {
        self.status.clone()
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Product subscription released");
        }
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Open a long-lived subscription to the store.
///
/// `on_snapshot` runs once per store change with the full collection, in the
/// order the store returned it. Status moves from `Loading` to `Ready` on the
/// first snapshot (even an empty one) and to `Failed` if the subscription
/// cannot be opened or breaks.
///
/// Must be called from within a Tokio runtime.
pub fn subscribe<F>(store: Arc<dyn ProductStore>, mut on_snapshot: F) -> Unsubscribe
where
    F: FnMut(Vec<Product>) + Send + 'static,
{
    let (status_tx, status) = watch::channel(FeedStatus::Loading);

    let task = tokio::spawn(async move {
        let mut snapshots = match store.subscribe().await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open product subscription");
                status_tx.send_replace(FeedStatus::Failed(e.to_string()));
                return;
            }
        };

        while let Some(next) = snapshots.next().await {
            match next {
                Ok(products) => {
                    tracing::debug!(count = products.len(), "Product snapshot received");
                    on_snapshot(products);
                    status_tx.send_if_modified(|status| {
                        if status.is_loading() {
                            *status = FeedStatus::Ready;
                            true
                        } else {
                            false
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "Product subscription failed");
                    status_tx.send_replace(FeedStatus::Failed(e.to_string()));
                    return;
                }
            }
        }

        tracing::warn!("Product subscription ended by the store");
        status_tx.send_replace(FeedStatus::Failed(
            "product subscription closed".to_string(),
        ));
    });

    Unsubscribe {
        task: Some(task),
        status,
    }
}

/// Local product state as seen by the UI.
#[derive(Debug, Clone, Serialize)]
pub struct FeedState {
    pub status: FeedStatus,
    pub products: Arc<Vec<Product>>,
    /// Incremented on every snapshot.
    #[serde(skip)]
    pub version: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            status: FeedStatus::Loading,
            products: Arc::new(Vec::new()),
            version: 0,
        }
    }
}

/// Server-wide mirror of the product collection.
///
/// Owns the single store subscription; page handlers and SSE clients read
/// from it and never touch the store subscription themselves.
#[derive(Clone)]
pub struct ProductFeed {
    state: watch::Receiver<FeedState>,
    subscription: Arc<Mutex<Option<Unsubscribe>>>,
}

impl ProductFeed {
    /// Subscribe to `store` and start mirroring.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(store: Arc<dyn ProductStore>) -> Self {
        let (state_tx, state) = watch::channel(FeedState::default());

        let snapshots_tx = state_tx.clone();
        let subscription = subscribe(store, move |products| {
            snapshots_tx.send_modify(|state| {
                state.products = Arc::new(products);
                state.status = FeedStatus::Ready;
                state.version += 1;
            });
        });

        // Forward failures; `Ready` is already set by the snapshot callback.
        let mut status = subscription.status();
        tokio::spawn(async move {
            while status.changed().await.is_ok() {
                let current = status.borrow_and_update().clone();
                if let FeedStatus::Failed(_) = current {
                    state_tx.send_modify(|state| state.status = current);
                }
            }
        });

        Self {
            state,
            subscription: Arc::new(Mutex::new(Some(subscription))),
        }
    }

    /// Current local state.
    #[must_use]
    pub fn current(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every snapshot or status change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    /// Wait until the first snapshot (or a failure) has arrived.
    pub async fn ready(&self) -> FeedState {
        let mut state = self.state.clone();
        // The sender lives in the subscription task; if it is gone the last value stands.
        let _ = state.wait_for(|s| !s.status.is_loading()).await;
        let current = state.borrow().clone();
        current
    }

    /// Release the store subscription. Later calls are no-ops.
    pub fn shutdown(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
            tracing::info!("Product feed stopped");
        }
    }
}
