//! Business logic services for admin.
//!
//! # Services
//!
//! - `gate` - Shared-password gate and its persisted session flag
//! - `live` - Live mirror of the product collection
//! - `products` - Validated create/delete against the product store

pub mod gate;
pub mod live;
pub mod products;

pub use gate::{
    AuthError, FlagStoreError, GateSecret, GateState, MemorySlot, SecretCheck, SessionFlagStore,
    SessionGate, SessionSlot, check_persisted_session,
};
pub use live::{FeedState, FeedStatus, ProductFeed, Unsubscribe, subscribe};
pub use products::{
    Confirmation, CreateError, DELETE_PROMPT, DeleteOutcome, ProductGateway, StoreError,
    ValidationError, validate_draft,
};
