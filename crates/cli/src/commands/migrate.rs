//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! boutique-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Admin migrations: `crates/admin/migrations/`

use tracing::info;

use boutique_admin::db;

use super::{CommandError, database_url};

/// Run admin database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// a migration fails.
pub async fn admin() -> Result<(), CommandError> {
    let database_url = database_url()?;

    info!("Connecting to admin database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running admin migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    info!("Admin migrations complete!");
    Ok(())
}
