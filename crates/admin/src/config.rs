//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the admin runs against an in-memory product
//! store when no database URL is configured.
//!
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the admin panel (default: `http://localhost:3001`)
//! - `ADMIN_GATE_PASSWORD` - Shared password that unlocks the panel (default: `ashvi@77`)
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_STORE_TIMEOUT_SECS` - Upper bound on each store call (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)
//!
//! ## Optional (TLS)
//! - `ADMIN_TLS_CERT` - PEM-encoded certificate chain
//! - `ADMIN_TLS_KEY` - PEM-encoded private key

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Password the gate falls back to when `ADMIN_GATE_PASSWORD` is unset.
pub const DEFAULT_GATE_PASSWORD: &str = "ashvi@77";

const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Gate password
    pub gate_password: SecretString,
    /// `PostgreSQL` database connection URL (contains password); `None` selects the memory store
    pub database_url: Option<SecretString>,
    /// Upper bound on each store call
    pub store_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let cert_pem = get_optional_env("ADMIN_TLS_CERT");
        let key_pem = get_optional_env("ADMIN_TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "ADMIN_TLS_*".to_string(),
                "Both ADMIN_TLS_CERT and ADMIN_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("ADMIN_BASE_URL", "http://localhost:3001");
        validate_base_url(&base_url)?;

        let gate_password = get_gate_password()?;
        let database_url = get_database_url("ADMIN_DATABASE_URL");
        let store_timeout = get_optional_env("ADMIN_STORE_TIMEOUT_SECS")
            .map(|raw| parse_timeout_secs(&raw))
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS));

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let tls = TlsConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            gate_password,
            database_url,
            store_timeout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Configuration for local runs and tests: memory store, default password.
    #[must_use]
    pub fn local() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            gate_password: SecretString::from(DEFAULT_GATE_PASSWORD),
            database_url: None,
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Whether the gate still uses the built-in password.
    #[must_use]
    pub fn uses_default_gate_password(&self) -> bool {
        self.gate_password.expose_secret() == DEFAULT_GATE_PASSWORD
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the gate password, rejecting an explicitly empty value.
fn get_gate_password() -> Result<SecretString, ConfigError> {
    match get_optional_env("ADMIN_GATE_PASSWORD") {
        Some(value) if value.is_empty() => Err(ConfigError::InvalidEnvVar(
            "ADMIN_GATE_PASSWORD".to_string(),
            "must not be empty".to_string(),
        )),
        Some(value) => Ok(SecretString::from(value)),
        None => Ok(SecretString::from(DEFAULT_GATE_PASSWORD)),
    }
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_BASE_URL".to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidEnvVar(
            "ADMIN_BASE_URL".to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw.parse::<u64>().map_err(|e| {
        ConfigError::InvalidEnvVar("ADMIN_STORE_TIMEOUT_SECS".to_string(), e.to_string())
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "ADMIN_STORE_TIMEOUT_SECS".to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig::local();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_local_config_uses_default_password() {
        let config = AdminConfig::local();
        assert!(config.uses_default_gate_password());
        assert!(config.database_url.is_none());
        assert!(!config.is_https());
    }

    #[test]
    fn test_parse_timeout_secs() {
        assert_eq!(parse_timeout_secs("3").unwrap(), Duration::from_secs(3));
        assert!(matches!(
            parse_timeout_secs("0"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_timeout_secs("soon").is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://admin.example.com").is_ok());
        assert!(validate_base_url("ftp://admin.example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn test_config_debug_redacts_secrets() {
        let mut config = AdminConfig::local();
        config.gate_password = SecretString::from("super-secret-gate");
        config.tls = Some(TlsConfig {
            cert_pem: "-----BEGIN CERTIFICATE-----".to_string(),
            key_pem: SecretString::from("super-secret-key"),
        });

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("localhost:3001"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-gate"));
        assert!(!debug_output.contains("super-secret-key"));
    }
}
