//! Tidepool client engine.
//!
//! The client-side commerce state synchronization engine for the Tidepool
//! storefront. It owns the state with real invariants:
//!
//! - [`store`] - cart and wishlist stores that run guest-local or
//!   server-authoritative, plus the login reconciler that switches them
//! - [`feed`] - paginated product feed accumulation with deduplication and
//!   stale-response rejection
//! - [`scroll`] - scroll position snapshots so back-navigation lands where
//!   the user left
//! - [`gate`] - deferred actions that wait for an authentication prompt
//!
//! Everything else in a storefront (rendering, routing, checkout forms) is a
//! collaborator behind the narrow interfaces in [`api`], [`persist`], and
//! [`scroll::ScrollSurface`].
//!
//! # Concurrency
//!
//! All work runs on one async runtime; network responses are the only source
//! of concurrency and may complete out of order. The feed accumulator's
//! stale-response guard and the stores' replace-with-server-state policy are
//! the two mechanisms that keep out-of-order completion harmless. There is no
//! request cancellation: superseded responses run to completion and are
//! discarded.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod config;
pub mod feed;
pub mod gate;
pub mod persist;
pub mod scroll;
pub mod store;
