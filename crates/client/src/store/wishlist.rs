//! Dual-mode wishlist store.

use chrono::Utc;
use tracing::{instrument, warn};

use tidepool_core::{ProductId, WishlistEntry};

use super::StoreMode;
use crate::api::{ApiError, WishlistApi};
use crate::auth::AuthFlag;
use crate::persist::{self, KeyValueStore, keys};

/// The wishlist. Set semantics: a product id appears at most once.
///
/// Wishlist mutations on the server return only an acknowledgement, so the
/// authenticated path follows every mutation with an explicit fetch; the
/// fetched collection replaces local state wholesale.
pub struct WishlistStore<A> {
    pub(crate) api: A,
    auth: AuthFlag,
    persist: Box<dyn KeyValueStore>,
    pub(crate) entries: Vec<WishlistEntry>,
    error: Option<ApiError>,
}

impl<A: WishlistApi> WishlistStore<A> {
    /// Create an empty wishlist store.
    pub fn new(api: A, auth: AuthFlag, persist: Box<dyn KeyValueStore>) -> Self {
        Self {
            api,
            auth,
            persist,
            entries: Vec::new(),
            error: None,
        }
    }

    /// Load the persisted collection into memory. Called once at boot.
    pub fn load(&mut self) {
        match persist::load::<Vec<WishlistEntry>>(self.persist.as_ref(), keys::WISHLIST) {
            Ok(Some(entries)) => self.entries = entries,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to load persisted wishlist, booting empty"),
        }
    }

    /// Add a product. A product already present stays present; a second
    /// entry is never created.
    #[instrument(skip(self))]
    pub async fn add(&mut self, product_id: ProductId) {
        match self.mode() {
            StoreMode::Guest => {
                if !self.contains(product_id) {
                    self.entries.push(WishlistEntry {
                        product_id,
                        added_at: Utc::now(),
                    });
                    self.persist_collection();
                }
            }
            StoreMode::Authenticated => {
                let result = self.api.add_wishlist_item(product_id).await;
                self.reconcile_after(result).await;
            }
        }
    }

    /// Remove a product.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, product_id: ProductId) {
        match self.mode() {
            StoreMode::Guest => {
                self.entries.retain(|e| e.product_id != product_id);
                self.persist_collection();
            }
            StoreMode::Authenticated => {
                let result = self.api.remove_wishlist_item(product_id).await;
                self.reconcile_after(result).await;
            }
        }
    }

    /// Flip a product's membership. Returns whether it is present afterwards.
    #[instrument(skip(self))]
    pub async fn toggle(&mut self, product_id: ProductId) -> bool {
        if self.contains(product_id) {
            self.remove(product_id).await;
        } else {
            self.add(product_id).await;
        }
        self.contains(product_id)
    }

    /// Replace local state with a fresh server fetch.
    ///
    /// `401` is expected background noise for a guest and collapses to an
    /// empty collection, as does `404`.
    ///
    /// # Errors
    ///
    /// Returns other fetch errors; local state is untouched on failure.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        match self.api.fetch_wishlist().await {
            Ok(rows) => {
                let mut entries: Vec<WishlistEntry> = Vec::with_capacity(rows.len());
                for row in rows {
                    // Set semantics even if the server misbehaves.
                    if !entries.iter().any(|e| e.product_id == row.product.id) {
                        entries.push(WishlistEntry {
                            product_id: row.product.id,
                            added_at: row.created_at,
                        });
                    }
                }
                self.entries = entries;
                self.error = None;
                self.persist_collection();
                Ok(())
            }
            Err(ApiError::Unauthorized) => {
                self.entries.clear();
                self.persist_collection();
                Ok(())
            }
            Err(e) if e.is_empty_collection() => {
                self.entries.clear();
                self.persist_collection();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the wishlist holds this product.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.entries.iter().any(|e| e.product_id == product_id)
    }

    /// Number of wishlisted products.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// The current entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    /// The last surfaced command failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Clear and return the surfaced failure (the user dismissed it).
    pub fn take_error(&mut self) -> Option<ApiError> {
        self.error.take()
    }

    fn mode(&self) -> StoreMode {
        StoreMode::current(&self.auth)
    }

    /// After a successful mutation, re-derive truth from the server; after
    /// a failure, keep pre-mutation state and surface the error.
    async fn reconcile_after(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "wishlist fetch after mutation failed");
                    self.error = Some(e);
                }
            }
            Err(e) => {
                warn!(error = %e, "wishlist mutation failed, keeping prior state");
                self.error = Some(e);
            }
        }
    }

    fn persist_collection(&self) {
        if let Err(e) = persist::save(self.persist.as_ref(), keys::WISHLIST, &self.entries) {
            warn!(error = %e, "failed to persist wishlist collection");
        }
    }
}
