//! Boutique Core - Shared types library.
//!
//! This crate provides the product types shared by the boutique components:
//! - `admin` - Password-gated product admin panel
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product records, store-assigned IDs, and non-negative prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
