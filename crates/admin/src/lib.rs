//! Ashvi Boutique admin library.
//!
//! This crate provides the product admin as a library, allowing it to be
//! tested and reused.
//!
//! # Security
//!
//! The panel is behind a single shared password. That gate keeps casual
//! visitors out and nothing more; deploy behind a private network.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
