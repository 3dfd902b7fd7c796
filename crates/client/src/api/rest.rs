//! `reqwest` implementation of the storefront API traits.

use std::sync::{Arc, RwLock};

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::form_urlencoded;

use tidepool_core::{CartLineId, Category, FeedTargetKey, ProductId, ProductRef};

use super::types::{
    AddCartItemRequest, AddWishlistRequest, CartPayload, MessageResponse, Paginated,
    UpdateCartItemRequest, WishlistRow,
};
use super::{ApiError, CartApi, CatalogApi, WishlistApi};
use crate::config::ClientConfig;

/// REST client for the storefront collaborator API.
///
/// Cheaply cloneable via `Arc`. Holds the account token behind a lock so the
/// login flow can attach it without rebuilding the client.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    http: reqwest::Client,
    /// Base URL without a trailing slash.
    base: String,
    token: RwLock<Option<SecretString>>,
}

impl RestClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RestClientInner {
                http,
                base: config.api_base_url.as_str().trim_end_matches('/').to_owned(),
                token: RwLock::new(config.api_token.clone()),
            }),
        })
    }

    /// Attach the account token issued at login.
    pub fn set_token(&self, token: SecretString) {
        if let Ok(mut slot) = self.inner.token.write() {
            *slot = Some(token);
        }
    }

    /// Drop the account token (logout).
    pub fn clear_token(&self) {
        if let Ok(mut slot) = self.inner.token.write() {
            *slot = None;
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base)
    }

    /// Execute a request and decode the JSON response.
    async fn execute<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let mut request = self.inner.http.request(method, self.endpoint(path));

        if let Some(token) = self
            .inner
            .token
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().map(|t| t.expose_secret().to_owned()))
        {
            request = request.header("Authorization", format!("Token {token}"));
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        map_status(status, path, &text)?;

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path,
                    body = %text.chars().take(500).collect::<String>(),
                    "failed to decode API response"
                );
                Err(ApiError::Decode(e))
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute::<T, ()>(Method::GET, path, None).await
    }
}

/// Map a non-success status to the engine error taxonomy.
fn map_status(status: StatusCode, path: &str, body: &str) -> Result<(), ApiError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(path.to_owned())),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(ApiError::Validation(validation_message(body)))
        }
        s if !s.is_success() => {
            debug!(status = %s, path, "unexpected API status");
            Err(ApiError::Validation(format!("server error ({s})")))
        }
        _ => Ok(()),
    }
}

/// Pull the user-facing message out of a validation error body.
///
/// The server sends either `{"message": "..."}` or `{"detail": "..."}`;
/// anything else falls back to the raw body.
fn validation_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        detail: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.detail))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

impl CartApi for RestClient {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<CartPayload, ApiError> {
        self.get("cart").await
    }

    #[instrument(skip(self))]
    async fn add_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartPayload, ApiError> {
        let body = AddCartItemRequest {
            product_id,
            quantity,
        };
        self.execute(Method::POST, "cart/items", Some(&body)).await
    }

    #[instrument(skip(self))]
    async fn update_cart_item(
        &self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<CartPayload, ApiError> {
        let body = UpdateCartItemRequest { quantity };
        self.execute(Method::PATCH, &format!("cart/items/{line_id}"), Some(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn remove_cart_item(&self, line_id: CartLineId) -> Result<CartPayload, ApiError> {
        self.execute::<CartPayload, ()>(Method::DELETE, &format!("cart/items/{line_id}"), None)
            .await
    }
}

impl WishlistApi for RestClient {
    #[instrument(skip(self))]
    async fn fetch_wishlist(&self) -> Result<Vec<WishlistRow>, ApiError> {
        self.get("wishlist").await
    }

    #[instrument(skip(self))]
    async fn add_wishlist_item(&self, product_id: ProductId) -> Result<(), ApiError> {
        let body = AddWishlistRequest { product_id };
        let ack: MessageResponse = self.execute(Method::POST, "wishlist", Some(&body)).await?;
        debug!(message = %ack.message, "wishlist add acknowledged");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_wishlist_item(&self, product_id: ProductId) -> Result<(), ApiError> {
        let ack: MessageResponse = self
            .execute::<MessageResponse, ()>(Method::DELETE, &format!("wishlist/{product_id}"), None)
            .await?;
        debug!(message = %ack.message, "wishlist remove acknowledged");
        Ok(())
    }
}

impl CatalogApi for RestClient {
    #[instrument(skip(self))]
    async fn fetch_products(
        &self,
        key: &FeedTargetKey,
        page: u32,
    ) -> Result<Paginated<ProductRef>, ApiError> {
        self.get(&products_path(key, page)).await
    }

    #[instrument(skip(self))]
    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("categories").await
    }
}

/// Build the products query path for a feed target key and page.
fn products_path(key: &FeedTargetKey, page: u32) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("page", &page.to_string());
    if let Some(category) = key.category {
        query.append_pair("category", &category.to_string());
    }
    if let Some(q) = &key.query {
        query.append_pair("q", q);
    }
    format!("products?{}", query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidepool_core::CategoryId;

    #[test]
    fn test_products_path_category() {
        let key = FeedTargetKey::category(CategoryId::new(5));
        assert_eq!(products_path(&key, 2), "products?page=2&category=5");
    }

    #[test]
    fn test_products_path_search_encodes_query() {
        let key = FeedTargetKey::search("live plants & moss".to_owned());
        assert_eq!(
            products_path(&key, 1),
            "products?page=1&q=live+plants+%26+moss"
        );
    }

    #[test]
    fn test_map_status_taxonomy() {
        assert!(matches!(
            map_status(StatusCode::UNAUTHORIZED, "wishlist", ""),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            map_status(StatusCode::NOT_FOUND, "cart", ""),
            Err(ApiError::NotFound(_))
        ));
        assert!(map_status(StatusCode::OK, "cart", "{}").is_ok());
    }

    #[test]
    fn test_validation_message_prefers_message_field() {
        let body = r#"{"message": "quantity must be positive"}"#;
        assert_eq!(validation_message(body), "quantity must be positive");

        let body = r#"{"detail": "invalid product"}"#;
        assert_eq!(validation_message(body), "invalid product");

        assert_eq!(validation_message("oops"), "oops");
    }
}
