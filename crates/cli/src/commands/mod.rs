//! CLI command implementations.

pub mod migrate;
pub mod products;
pub mod seed;

use secrecy::SecretString;

/// Database URL for the admin, with the same fallback the server uses.
///
/// # Errors
///
/// Returns an error if neither `ADMIN_DATABASE_URL` nor `DATABASE_URL` is set.
pub fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.is_empty())
        .map(SecretString::from)
        .ok_or(CommandError::MissingEnvVar("ADMIN_DATABASE_URL"))
}

/// Errors shared by the CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
