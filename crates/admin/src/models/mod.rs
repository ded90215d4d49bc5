//! Domain models for the admin.
//!
//! - [`DraftProduct`] - the unsaved add-product form
//! - [`session`] - keys of the values kept in the operator's session

pub mod draft;
pub mod session;

pub use draft::{DraftField, DraftProduct};
pub use session::keys as session_keys;
