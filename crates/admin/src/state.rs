//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::db::ProductStore;
use crate::services::{GateSecret, ProductFeed, ProductGateway};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// product store, the live product feed, and the gate secret.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: Arc<dyn ProductStore>,
    gateway: ProductGateway,
    feed: ProductFeed,
    gate_secret: GateSecret,
}

impl AppState {
    /// Create a new application state and start the product feed.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(config: AdminConfig, store: Arc<dyn ProductStore>) -> Self {
        let gateway = ProductGateway::new(store.clone(), config.store_timeout);
        let feed = ProductFeed::start(store.clone());
        let gate_secret = GateSecret::new(config.gate_password.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                gateway,
                feed,
                gate_secret,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the product store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.inner.store
    }

    /// Get a reference to the create/delete gateway.
    #[must_use]
    pub fn gateway(&self) -> &ProductGateway {
        &self.inner.gateway
    }

    /// Get a reference to the live product feed.
    #[must_use]
    pub fn feed(&self) -> &ProductFeed {
        &self.inner.feed
    }

    /// Get a reference to the gate password.
    #[must_use]
    pub fn gate_secret(&self) -> &GateSecret {
        &self.inner.gate_secret
    }
}
