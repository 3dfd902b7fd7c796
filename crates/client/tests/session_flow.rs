//! End-to-end session scenarios: a shopper browses a feed, fills a guest
//! cart and wishlist, logs in, and navigates back to the feed. Everything
//! runs against scripted API mocks - these tests pin the engine's
//! cross-component behavior, not the HTTP layer.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use chrono::Utc;
use tidepool_client::api::types::{CartItemPayload, CartPayload, Paginated, WishlistRow};
use tidepool_client::api::{ApiError, CartApi, CatalogApi, WishlistApi};
use tidepool_client::auth::AuthFlag;
use tidepool_client::feed::{FeedController, LoadMoreSentinel};
use tidepool_client::gate::{ActionGate, GateOutcome};
use tidepool_client::persist::MemoryStore;
use tidepool_client::scroll::{ScrollMemory, ScrollSession, ScrollSurface};
use tidepool_client::store::{CartStore, LoginReconciler, WishlistStore};
use tidepool_core::{
    CartLineId, Category, CategoryId, CurrencyCode, FeedTargetKey, Price, ProductId, ProductRef,
    WishlistEntryId,
};

// =============================================================================
// Scripted collaborator API
// =============================================================================

fn product(id: i64) -> ProductRef {
    ProductRef {
        id: ProductId::new(id),
        name: format!("product-{id}"),
        price: Price::from_cents(1500, CurrencyCode::USD),
        image: None,
    }
}

/// One fake server for all three API traits. Fetch counts are observable so
/// tests can assert "exactly one request" properties.
struct FakeServer {
    cart: Mutex<CartPayload>,
    wishlist: Mutex<Vec<WishlistRow>>,
    product_fetches: Mutex<Vec<(FeedTargetKey, u32)>>,
}

impl FakeServer {
    fn new() -> Self {
        Self {
            cart: Mutex::new(CartPayload {
                items: Vec::new(),
                total: rust_decimal::Decimal::ZERO,
            }),
            wishlist: Mutex::new(Vec::new()),
            product_fetches: Mutex::new(Vec::new()),
        }
    }

    fn seed_wishlist(&self, ids: &[i64]) {
        *self.wishlist.lock().unwrap() = ids
            .iter()
            .map(|&id| WishlistRow {
                id: WishlistEntryId::new(id),
                product: product(id),
                created_at: Utc::now(),
            })
            .collect();
    }

    fn product_fetch_count(&self) -> usize {
        self.product_fetches.lock().unwrap().len()
    }
}

impl CartApi for &FakeServer {
    async fn fetch_cart(&self) -> Result<CartPayload, ApiError> {
        Ok(self.cart.lock().unwrap().clone())
    }

    async fn add_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartPayload, ApiError> {
        let mut cart = self.cart.lock().unwrap();
        cart.items.push(CartItemPayload {
            id: CartLineId::new(product_id.as_i64() * 7),
            product: product(product_id.as_i64()),
            quantity,
        });
        Ok(cart.clone())
    }

    async fn update_cart_item(
        &self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<CartPayload, ApiError> {
        let mut cart = self.cart.lock().unwrap();
        for item in &mut cart.items {
            if item.id == line_id {
                item.quantity = quantity;
            }
        }
        Ok(cart.clone())
    }

    async fn remove_cart_item(&self, line_id: CartLineId) -> Result<CartPayload, ApiError> {
        let mut cart = self.cart.lock().unwrap();
        cart.items.retain(|i| i.id != line_id);
        Ok(cart.clone())
    }
}

impl WishlistApi for &FakeServer {
    async fn fetch_wishlist(&self) -> Result<Vec<WishlistRow>, ApiError> {
        Ok(self.wishlist.lock().unwrap().clone())
    }

    async fn add_wishlist_item(&self, product_id: ProductId) -> Result<(), ApiError> {
        let mut wishlist = self.wishlist.lock().unwrap();
        if !wishlist.iter().any(|r| r.product.id == product_id) {
            wishlist.push(WishlistRow {
                id: WishlistEntryId::new(product_id.as_i64()),
                product: product(product_id.as_i64()),
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn remove_wishlist_item(&self, product_id: ProductId) -> Result<(), ApiError> {
        self.wishlist
            .lock()
            .unwrap()
            .retain(|r| r.product.id != product_id);
        Ok(())
    }
}

impl CatalogApi for &FakeServer {
    async fn fetch_products(
        &self,
        key: &FeedTargetKey,
        page: u32,
    ) -> Result<Paginated<ProductRef>, ApiError> {
        self.product_fetches.lock().unwrap().push((key.clone(), page));
        // Two pages of three products per category.
        let base = key.category.map_or(0, |c| c.as_i64() * 100) + i64::from(page - 1) * 3;
        Ok(Paginated {
            count: 6,
            next: (page < 2).then(|| format!("page={}", page + 1)),
            previous: None,
            results: (1..=3).map(|i| product(base + i)).collect(),
        })
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        Ok(vec![Category {
            id: CategoryId::new(1),
            name: "Aquatics".to_owned(),
            image: None,
        }])
    }
}

#[derive(Debug, Default)]
struct FakeViewport {
    offset: u32,
    native_restoration: bool,
}

impl ScrollSurface for FakeViewport {
    fn scroll_to(&mut self, offset_px: u32) {
        self.offset = offset_px;
    }

    fn set_native_restoration(&mut self, enabled: bool) {
        self.native_restoration = enabled;
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn guest_browses_logs_in_and_keeps_server_state() {
    let server = FakeServer::new();
    server.seed_wishlist(&[42]);

    let auth = AuthFlag::new();
    let mut cart = CartStore::new(&server, auth.clone(), Box::new(MemoryStore::new()));
    let mut wishlist = WishlistStore::new(&server, auth.clone(), Box::new(MemoryStore::new()));
    cart.load();
    wishlist.load();

    // Guest fills cart and wishlist locally; no server traffic.
    cart.add(product(101), 2).await;
    wishlist.add(ProductId::new(101)).await;
    assert_eq!(cart.count(), 2);
    assert_eq!(wishlist.count(), 1);

    // Login: server collections replace the guest ones.
    auth.set_authenticated(true);
    let mut reconciler = LoginReconciler::new();
    reconciler.observe(&auth, &mut cart, &mut wishlist).await;

    assert_eq!(cart.count(), 0); // the account's cart was empty
    assert_eq!(wishlist.count(), 1);
    assert!(wishlist.contains(ProductId::new(42)));
    assert!(!wishlist.contains(ProductId::new(101))); // guest item discarded

    // Authenticated mutations round-trip through the server.
    cart.add(product(7), 1).await;
    cart.set_quantity(ProductId::new(7), 5).await;
    assert_eq!(cart.count(), 5);
    assert_eq!(cart.total().to_string(), "75.00");
}

#[tokio::test]
async fn feed_back_navigation_restores_without_refetch_and_rescrolls() {
    let server = FakeServer::new();
    let mut feed = FeedController::new(&server);
    let mut sentinel = LoadMoreSentinel::new();
    let mut scroll = ScrollMemory::new();

    let aquatics = FeedTargetKey::category(CategoryId::new(1));

    // First visit: page 1, then the sentinel comes into view and pulls
    // page 2.
    assert!(!feed.show(aquatics.clone()).await);
    if sentinel.set_visible(true) {
        feed.load_more().await;
    }
    assert_eq!(feed.feed().items().len(), 6);
    assert!(!feed.feed().has_more());
    assert_eq!(server.product_fetch_count(), 2);

    // Leaving the view captures the scroll offset.
    scroll.depart(&aquatics.route_key(), 880);

    // Back navigation: cached accumulation, zero fetches, scroll restored
    // on the settle schedule.
    let restored = feed.show(aquatics.clone()).await;
    assert!(restored);
    assert_eq!(server.product_fetch_count(), 2);

    let offset = scroll.enter(&aquatics.route_key(), restored);
    assert_eq!(offset, Some(880));

    let mut session = ScrollSession::begin(FakeViewport::default());
    session.restore(offset.unwrap()).await;
    let viewport = session.end();
    assert_eq!(viewport.offset, 880);
    assert!(viewport.native_restoration); // handed back on teardown
}

#[tokio::test]
async fn deferred_checkout_runs_after_login_prompt() {
    let auth = AuthFlag::new();
    let mut gate = ActionGate::new(auth.clone());
    let checkout_started = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));

    let flag = std::sync::Arc::clone(&checkout_started);
    let outcome = gate.guard(move || {
        flag.store(true, std::sync::atomic::Ordering::Relaxed);
    });
    assert_eq!(outcome, GateOutcome::LoginRequired);
    assert!(!checkout_started.load(std::sync::atomic::Ordering::Relaxed));

    // The login prompt resolves.
    auth.set_authenticated(true);
    assert!(gate.resume());
    assert!(checkout_started.load(std::sync::atomic::Ordering::Relaxed));
}
