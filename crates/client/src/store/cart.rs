//! Dual-mode cart store.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{instrument, warn};

use tidepool_core::{CartLine, CartLineId, ProductId, ProductRef};

use super::StoreMode;
use crate::api::types::CartPayload;
use crate::api::{ApiError, CartApi};
use crate::auth::AuthFlag;
use crate::persist::{self, KeyValueStore, keys};

/// The cart.
///
/// Holds at most one line per product id; a line's quantity is always at
/// least 1 (quantity zero means the line is removed, never stored). See the
/// [module docs](super) for the guest/authenticated mode split.
pub struct CartStore<A> {
    pub(crate) api: A,
    auth: AuthFlag,
    persist: Box<dyn KeyValueStore>,
    lines: Vec<CartLine>,
    /// Server line ids by product, refreshed on every reconciliation.
    /// Empty while guest.
    server_lines: HashMap<ProductId, CartLineId>,
    error: Option<ApiError>,
}

impl<A: CartApi> CartStore<A> {
    /// Create an empty cart store.
    pub fn new(api: A, auth: AuthFlag, persist: Box<dyn KeyValueStore>) -> Self {
        Self {
            api,
            auth,
            persist,
            lines: Vec::new(),
            server_lines: HashMap::new(),
            error: None,
        }
    }

    /// Load the persisted collection into memory. Called once at boot,
    /// before any reconciliation; a missing or unreadable value boots empty.
    pub fn load(&mut self) {
        match persist::load::<Vec<CartLine>>(self.persist.as_ref(), keys::CART) {
            Ok(Some(lines)) => self.lines = lines,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to load persisted cart, booting empty"),
        }
    }

    /// Add `quantity` units of a product.
    ///
    /// If the product is already in the cart its line quantity grows; a
    /// second line is never created.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&mut self, product: ProductRef, quantity: u32) {
        let quantity = quantity.max(1);
        match self.mode() {
            StoreMode::Guest => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
                    line.quantity += quantity;
                } else {
                    self.lines.push(CartLine::new(product, quantity));
                }
                self.persist_collection();
            }
            StoreMode::Authenticated => {
                let result = self.api.add_cart_item(product.id, quantity).await;
                self.apply_mutation_result(result);
            }
        }
    }

    /// Remove a product's line entirely.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, product_id: ProductId) {
        match self.mode() {
            StoreMode::Guest => {
                self.lines.retain(|l| l.product.id != product_id);
                self.persist_collection();
            }
            StoreMode::Authenticated => {
                let Some(line_id) = self.server_lines.get(&product_id).copied() else {
                    return;
                };
                let result = self.api.remove_cart_item(line_id).await;
                self.apply_mutation_result(result);
            }
        }
    }

    /// Set a line's quantity. Zero removes the line - a zero-quantity line
    /// is never stored.
    #[instrument(skip(self))]
    pub async fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id).await;
            return;
        }
        match self.mode() {
            StoreMode::Guest => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
                    line.quantity = quantity;
                    self.persist_collection();
                }
            }
            StoreMode::Authenticated => {
                let Some(line_id) = self.server_lines.get(&product_id).copied() else {
                    return;
                };
                let result = self.api.update_cart_item(line_id, quantity).await;
                self.apply_mutation_result(result);
            }
        }
    }

    /// Empty the cart locally. Used after checkout, when the server-side
    /// cart has already been consumed by the order.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.server_lines.clear();
        self.persist_collection();
    }

    /// Replace local state with a fresh server fetch.
    ///
    /// A `404` means the account has no cart yet and collapses to an empty
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; local state is untouched on failure.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        match self.api.fetch_cart().await {
            Ok(payload) => {
                self.apply_server_cart(payload);
                Ok(())
            }
            Err(e) if e.is_empty_collection() => {
                self.lines.clear();
                self.server_lines.clear();
                self.persist_collection();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the cart holds a line for this product.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.lines.iter().any(|l| l.product.id == product_id)
    }

    /// Total units across all lines (the cart badge number).
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Cart total, computed from the in-memory lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| l.product.price.amount * Decimal::from(l.quantity))
            .sum()
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
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

    /// A mutation response is fresh server state; replace wholesale.
    /// On failure, keep pre-mutation state and surface the error.
    fn apply_mutation_result(&mut self, result: Result<CartPayload, ApiError>) {
        match result {
            Ok(payload) => self.apply_server_cart(payload),
            Err(e) => {
                warn!(error = %e, "cart mutation failed, keeping prior state");
                self.error = Some(e);
            }
        }
    }

    fn apply_server_cart(&mut self, payload: CartPayload) {
        self.server_lines = payload
            .items
            .iter()
            .map(|item| (item.product.id, item.id))
            .collect();

        // Enforce line uniqueness even if the server misbehaves: merge
        // duplicate product ids into one line.
        let mut lines: Vec<CartLine> = Vec::with_capacity(payload.items.len());
        for item in payload.items {
            if let Some(line) = lines.iter_mut().find(|l| l.product.id == item.product.id) {
                line.quantity += item.quantity;
            } else {
                lines.push(CartLine::new(item.product, item.quantity));
            }
        }
        self.lines = lines;
        self.error = None;
        self.persist_collection();
    }

    fn persist_collection(&self) {
        if let Err(e) = persist::save(self.persist.as_ref(), keys::CART, &self.lines) {
            warn!(error = %e, "failed to persist cart collection");
        }
    }
}
