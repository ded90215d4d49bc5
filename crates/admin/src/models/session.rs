//! Session-related types for the admin gate.
//!
//! The gate stores exactly one value per session: the unlock marker.

/// Session keys for admin gate data.
pub mod keys {
    /// Key of the persisted unlock flag.
    pub const ADMIN_AUTH: &str = "adminAuth";
}

/// Value the unlock flag holds once the gate has been passed.
pub const UNLOCKED_MARKER: &str = "true";
