//! Tidepool Core - Shared domain types.
//!
//! This crate provides the types shared by every Tidepool component:
//! - `client` - the commerce state synchronization engine
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, catalog and commerce entities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
