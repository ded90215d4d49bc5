//! Product store backends.
//!
//! The product collection is the system of record. Every backend implements
//! [`ProductStore`]; subscribers always receive the full collection, never a
//! diff.
//!
//! # Backends
//!
//! - [`MemoryProductStore`] - process-local collection for local runs and tests
//! - [`PgProductStore`] - `PostgreSQL` table with `LISTEN/NOTIFY` change push
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p boutique-cli -- migrate
//! ```

pub mod memory;
pub mod products;

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use boutique_core::{NewProduct, Product, ProductId};

pub use memory::MemoryProductStore;
pub use products::PgProductStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The store refused or could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A live feed of full collection snapshots.
///
/// The first item is the collection as of subscription time. The stream ends
/// after yielding an error.
pub type SnapshotStream = BoxStream<'static, Result<Vec<Product>, RepositoryError>>;

/// The product collection.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Read the full collection in store order.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Insert a new document; the store assigns and returns its ID.
    async fn add(&self, product: NewProduct) -> Result<ProductId, RepositoryError>;

    /// Remove a document. Removing an unknown ID is not an error.
    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError>;

    /// Open a long-lived subscription to full-collection snapshots.
    async fn subscribe(&self) -> Result<SnapshotStream, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
