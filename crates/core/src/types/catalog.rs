//! Catalog display types.
//!
//! A [`ProductRef`] is an immutable snapshot of a product as the catalog API
//! returned it. Cart lines and wishlist entries store copies of it, never
//! live references, so a later catalog refresh cannot mutate a held item.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// Product or category image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

/// Opaque product identity plus the display fields feeds and carts need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current unit price.
    pub price: Price,
    /// Primary image, if any.
    pub image: Option<ProductImage>,
}

/// A browsable product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Category image, if any.
    pub image: Option<ProductImage>,
}
