//! `PostgreSQL` product store.
//!
//! Documents live in `public.products`. A trigger sends
//! `NOTIFY products_changed` after every insert, update, or delete, including
//! writes made by other tools, and each notification makes subscribers re-read
//! the whole table.
//!
//! Queries are built at runtime (`sqlx::query_as`) so the crate builds without
//! a live database.

use async_stream::stream;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgListener;

use boutique_core::{NewProduct, Price, Product, ProductId};

use super::{ProductStore, RepositoryError, SnapshotStream};

/// Notification channel the `products` trigger publishes on.
pub const CHANGE_CHANNEL: &str = "products_changed";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: Decimal,
    details: String,
    image: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price,
            details: row.details,
            image: row.image,
            created_at: row.created_at,
        })
    }
}

/// Product collection backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn fetch_all(pool: &PgPool) -> Result<Vec<Product>, RepositoryError> {
    let rows: Vec<ProductRow> = sqlx::query_as(
        r"
        SELECT id, name, price, details, image, created_at
        FROM products
        ORDER BY created_at, id
        ",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Product::try_from).collect()
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        fetch_all(&self.pool).await
    }

    async fn add(&self, product: NewProduct) -> Result<ProductId, RepositoryError> {
        let id: String = sqlx::query_scalar(
            r"
            INSERT INTO products (name, price, details, image, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(&product.details)
        .bind(&product.image)
        .bind(product.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(ProductId::new(id))
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn subscribe(&self) -> Result<SnapshotStream, RepositoryError> {
        // Listen before the first read so no change slips in between.
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        let initial = fetch_all(&self.pool).await?;
        let pool = self.pool.clone();

        Ok(Box::pin(stream! {
            yield Ok(initial);
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        tracing::debug!(
                            operation = notification.payload(),
                            "Product collection changed"
                        );
                        match fetch_all(&pool).await {
                            Ok(snapshot) => yield Ok(snapshot),
                            Err(e) => {
                                yield Err(e);
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(RepositoryError::Database(e));
                        break;
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn row(price: Decimal) -> ProductRow {
        ProductRow {
            id: "abc123".to_string(),
            name: "Dress".to_string(),
            price,
            details: String::new(),
            image: "https://img.example/dress.jpg".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_row_converts_to_product() {
        let product = Product::try_from(row(Decimal::new(129_950, 2))).unwrap();
        assert_eq!(product.id.as_str(), "abc123");
        assert_eq!(product.price.to_string(), "1299.5");
    }

    #[test]
    fn test_negative_price_row_is_data_corruption() {
        let err = Product::try_from(row(Decimal::new(-1, 0))).unwrap_err();
        match err {
            RepositoryError::DataCorruption(message) => assert!(message.contains("abc123")),
            other => panic!("expected DataCorruption, got {other:?}"),
        }
    }
}
