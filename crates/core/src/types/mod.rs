//! Core types for the boutique.
//!
//! This module provides type-safe wrappers for the product catalog.

pub mod id;
pub mod price;
pub mod product;

pub use id::*;
pub use price::{Price, PriceError};
pub use product::{NewProduct, Product};
