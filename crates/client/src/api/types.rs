//! Wire types for the storefront REST API.
//!
//! These mirror the collaborator's response shapes exactly; domain code
//! converts them into `tidepool-core` types at the store boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tidepool_core::{CartLineId, ProductId, ProductRef, WishlistEntryId};

// =============================================================================
// Cart
// =============================================================================

/// One line of the server-side cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemPayload {
    /// Server-assigned line ID.
    pub id: CartLineId,
    /// Product snapshot.
    pub product: ProductRef,
    /// Units of this product.
    pub quantity: u32,
}

/// The server-side cart collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPayload {
    /// Cart lines.
    pub items: Vec<CartItemPayload>,
    /// Server-computed total.
    pub total: Decimal,
}

/// Body for `POST /cart/items`.
#[derive(Debug, Clone, Serialize)]
pub struct AddCartItemRequest {
    /// Product to add.
    pub product_id: ProductId,
    /// Units to add.
    pub quantity: u32,
}

/// Body for `PATCH /cart/items/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCartItemRequest {
    /// New quantity for the line.
    pub quantity: u32,
}

// =============================================================================
// Wishlist
// =============================================================================

/// One row of the server-side wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistRow {
    /// Server-assigned row ID.
    pub id: WishlistEntryId,
    /// Product snapshot.
    pub product: ProductRef,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Body for `POST /wishlist`.
#[derive(Debug, Clone, Serialize)]
pub struct AddWishlistRequest {
    /// Product to wishlist.
    pub product_id: ProductId,
}

/// Acknowledgement body for wishlist mutations.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

// =============================================================================
// Pagination
// =============================================================================

/// Uniform pagination envelope for list endpoints.
///
/// `next == None` is the sole "no more pages" signal; an empty first page
/// with no cursor means zero results, a terminal state distinct from an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total result count across all pages.
    pub count: u64,
    /// Opaque cursor for the next page, if any.
    pub next: Option<String>,
    /// Opaque cursor for the previous page, if any.
    pub previous: Option<String>,
    /// This page's items.
    pub results: Vec<T>,
}
