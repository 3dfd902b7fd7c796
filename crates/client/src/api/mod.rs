//! Storefront REST API collaborator.
//!
//! # Architecture
//!
//! - The server is the source of truth while authenticated - stores replace
//!   their collections from responses, no incremental patching
//! - [`CartApi`], [`WishlistApi`], and [`CatalogApi`] are the seams the
//!   engine consumes; [`RestClient`] is the `reqwest` implementation and
//!   tests inject mocks
//! - Response envelopes are uniform: collections come back whole, product
//!   pages use `count`/`next`/`previous`/`results`
//!
//! # Example
//!
//! ```rust,ignore
//! use tidepool_client::api::{CatalogApi, RestClient};
//! use tidepool_core::FeedTargetKey;
//!
//! let client = RestClient::new(&config)?;
//! let page = client.fetch_products(&FeedTargetKey::default(), 1).await?;
//! ```

mod rest;
pub mod types;

pub use rest::RestClient;

use thiserror::Error;
use tidepool_core::{CartLineId, Category, FeedTargetKey, ProductId, ProductRef};

use types::{CartPayload, Paginated, WishlistRow};

/// Errors returned by the storefront API.
///
/// This is the engine-wide failure taxonomy: stores and feeds catch it at
/// their boundary, surface it through an `error` field, and never retry
/// automatically.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failed (DNS, connect, timeout). User-retryable.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server rejected the credentials (401). Expected background noise
    /// for guest wishlist fetches, which collapse it to an empty collection.
    #[error("unauthorized")]
    Unauthorized,

    /// The resource does not exist (404). On collection endpoints this means
    /// "no data", not a broken request.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server rejected the request body; the message is shown verbatim.
    #[error("{0}")]
    Validation(String),

    /// The response body did not match the wire contract.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether a collection fetch failing with this error means "empty
    /// collection" rather than a surfaced failure.
    #[must_use]
    pub const fn is_empty_collection(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// The engine runs on a single cooperative runtime; futures never cross
// threads, so the traits do not promise Send.
/// Cart collection operations.
#[allow(async_fn_in_trait)]
pub trait CartApi {
    /// Fetch the server-side cart collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; `NotFound` means the account
    /// has no cart yet.
    async fn fetch_cart(&self) -> Result<CartPayload, ApiError>;

    /// Add a product to the cart. Returns the updated collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the line.
    async fn add_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartPayload, ApiError>;

    /// Change the quantity of an existing line. Returns the updated collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the line does not exist.
    async fn update_cart_item(
        &self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<CartPayload, ApiError>;

    /// Remove a line from the cart. Returns the updated collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the line does not exist.
    async fn remove_cart_item(&self, line_id: CartLineId) -> Result<CartPayload, ApiError>;
}

/// Wishlist collection operations.
#[allow(async_fn_in_trait)]
pub trait WishlistApi {
    /// Fetch the server-side wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; `Unauthorized` is expected
    /// while a guest and is collapsed by the caller.
    async fn fetch_wishlist(&self) -> Result<Vec<WishlistRow>, ApiError>;

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product is unknown.
    async fn add_wishlist_item(&self, product_id: ProductId) -> Result<(), ApiError>;

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn remove_wishlist_item(&self, product_id: ProductId) -> Result<(), ApiError>;
}

/// Catalog read operations.
#[allow(async_fn_in_trait)]
pub trait CatalogApi {
    /// Fetch one page of products matching a feed target key.
    ///
    /// `next == None` in the envelope is the sole "no more pages" signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn fetch_products(
        &self,
        key: &FeedTargetKey,
        page: u32,
    ) -> Result<Paginated<ProductRef>, ApiError>;

    /// Fetch the category list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError>;
}
