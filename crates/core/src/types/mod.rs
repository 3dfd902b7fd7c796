//! Core types for Tidepool.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod commerce;
pub mod id;
pub mod price;

pub use catalog::{Category, ProductImage, ProductRef};
pub use commerce::{CartLine, FeedTargetKey, WishlistEntry};
pub use id::*;
pub use price::{CurrencyCode, Price};
