//! Cart, wishlist, and feed identity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::ProductRef;
use super::id::{CategoryId, ProductId};

/// A single cart line.
///
/// Invariant: at most one line per product id, and `quantity >= 1`. A
/// quantity of zero means the line is deleted, never stored as zero; the
/// cart store enforces both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Snapshot of the product when it was added.
    pub product: ProductRef,
    /// Units of this product in the cart.
    pub quantity: u32,
}

impl CartLine {
    /// Create a new line. Quantities below 1 are clamped to 1; callers that
    /// mean "remove" must not construct a line at all.
    #[must_use]
    pub fn new(product: ProductRef, quantity: u32) -> Self {
        Self {
            product,
            quantity: quantity.max(1),
        }
    }
}

/// A wishlist membership record. Set semantics: a product id appears at
/// most once, enforced by the wishlist store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    /// Product ID.
    pub product_id: ProductId,
    /// When the product was wishlisted.
    pub added_at: DateTime<Utc>,
}

/// Identifies *what* a paginated feed currently shows.
///
/// All fetched pages are valid only while they answer the active key; a
/// response tagged with a stale key is discarded by the feed accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FeedTargetKey {
    /// Category filter, if any.
    pub category: Option<CategoryId>,
    /// Search query, if any.
    pub query: Option<String>,
}

impl FeedTargetKey {
    /// Key for a category listing feed.
    #[must_use]
    pub const fn category(id: CategoryId) -> Self {
        Self {
            category: Some(id),
            query: None,
        }
    }

    /// Key for a search results feed.
    #[must_use]
    pub const fn search(query: String) -> Self {
        Self {
            category: None,
            query: Some(query),
        }
    }

    /// Stable string form, used as a scroll snapshot route key.
    #[must_use]
    pub fn route_key(&self) -> String {
        match (&self.category, &self.query) {
            (Some(id), _) => format!("category:{id}"),
            (None, Some(q)) => format!("search:{q}"),
            (None, None) => "all".to_owned(),
        }
    }
}
