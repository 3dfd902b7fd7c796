//! Dual-mode entity stores.
//!
//! The cart and wishlist stores own quantity/membership state and run in one
//! of two modes, derived on every command from the shared [`AuthFlag`]:
//!
//! - **Guest**: commands mutate in-memory state synchronously and persist
//!   the full collection immediately. No network, failure-free.
//! - **Authenticated**: commands issue a request against the server
//!   collection and, on success, replace the entire local collection with
//!   the server's state (full reconciliation, not incremental patching).
//!   On failure the pre-mutation state is retained and an `error` field is
//!   surfaced; nothing is retried and nothing was optimistically applied,
//!   so there is nothing to roll back.
//!
//! Read operations (`contains`, `count`, `total`) always answer from the
//! in-memory collection, so callers never branch on mode.

mod cart;
mod reconcile;
mod wishlist;

pub use cart::CartStore;
pub use reconcile::LoginReconciler;
pub use wishlist::WishlistStore;

/// The mode an entity store is operating in, derived from the auth flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Local-only state, persisted to durable storage.
    Guest,
    /// Server-authoritative state, replaced wholesale after every mutation.
    Authenticated,
}

impl StoreMode {
    pub(crate) fn current(auth: &crate::auth::AuthFlag) -> Self {
        if auth.is_authenticated() {
            Self::Authenticated
        } else {
            Self::Guest
        }
    }
}
