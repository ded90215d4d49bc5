//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers
//! 4. Session layer (tower-sessions; holds the gate flag)
//! 5. Gate extractor ([`RequireUnlocked`]) on every product route

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{GateRejection, LOGIN_PATH, RequireUnlocked};
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, postgres_session_store};
