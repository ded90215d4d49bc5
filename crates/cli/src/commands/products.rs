//! Product inspection commands.

use boutique_admin::db::{self, PgProductStore, ProductStore};

use super::database_url;

/// Print every product as one JSON object per line, in store order.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a row is invalid.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(&database_url()?).await?;
    let products = PgProductStore::new(pool).list().await?;

    tracing::info!(count = products.len(), "Fetched products");

    #[allow(clippy::print_stdout)]
    {
        for product in &products {
            println!("{}", serde_json::to_string(product)?);
        }
    }

    Ok(())
}
