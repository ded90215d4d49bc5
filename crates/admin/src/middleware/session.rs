//! Session middleware configuration for admin.
//!
//! The session carries the gate flag. `PostgreSQL`-backed sessions are used
//! when a database is configured, in-memory sessions otherwise.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "boutique_admin_session";

/// Session expiry time in seconds (30 days of inactivity).
///
/// The gate flag has no logout; the session outliving browser restarts is
/// what keeps the operator unlocked.
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the `PostgreSQL` session store in the `admin` schema.
///
/// # Errors
///
/// Returns an error if the schema or table name is rejected.
pub fn postgres_session_store(pool: &PgPool) -> Result<PostgresStore, String> {
    // The session table is created via migration in the admin schema.
    PostgresStore::new(pool.clone())
        .with_schema_name("admin")
        .map_err(|e| e.to_string())?
        .with_table_name("session")
        .map_err(|e| e.to_string())
}

/// Create the session layer over any session store.
///
/// # Arguments
///
/// * `store` - Session store (`PostgresStore` or `MemoryStore`)
/// * `config` - Admin configuration (for determining HTTPS mode)
#[must_use]
pub fn create_session_layer<S>(store: S, config: &AdminConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
