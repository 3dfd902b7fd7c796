//! Paginated feed accumulation.
//!
//! A feed assembles product pages for one target at a time - a category
//! listing or a search result - across incremental loads and back/forward
//! navigation. The two correctness properties live here:
//!
//! - **Stale-response rejection**: every outstanding fetch is tagged with
//!   the [`FeedTargetKey`] it was issued for, and a response is applied only
//!   while that tag still matches the active key. A slow response for a
//!   category the user has since left can never overwrite the current feed.
//! - **Dedup on append**: pages past the first only append ids not already
//!   accumulated, preserving first-seen order; page 1 replaces wholesale.
//!
//! [`FeedAccumulator`] is sans-io: its methods return a [`PageRequest`]
//! describing the fetch the caller must perform, and results come back
//! through [`FeedAccumulator::apply`]. [`FeedController`] is the async
//! driver that performs those requests against a [`CatalogApi`]. That split
//! keeps out-of-order-response behavior testable without a network.

mod controller;
mod sentinel;

pub use controller::FeedController;
pub use sentinel::LoadMoreSentinel;

use std::collections::HashSet;

use tracing::debug;

use tidepool_core::{FeedTargetKey, ProductId, ProductRef};

use crate::api::ApiError;
use crate::api::types::Paginated;

/// A fetch the caller must perform on the accumulator's behalf.
///
/// The tag (`key`) is the stale-response guard: hand the same request back
/// to [`FeedAccumulator::apply`] with the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// The target the fetch was issued for.
    pub key: FeedTargetKey,
    /// 1-based page number.
    pub page: u32,
}

/// Where the feed is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// No target set yet.
    Idle,
    /// First page of the active target is outstanding.
    Fetching,
    /// At least one page is showing and nothing is outstanding.
    Loaded,
    /// A follow-up page is outstanding behind existing items.
    FetchingMore,
}

/// Accumulates deduplicated product pages for the active target key.
#[derive(Debug, Default)]
pub struct FeedAccumulator {
    active: Option<FeedTargetKey>,
    items: Vec<ProductRef>,
    seen: HashSet<ProductId>,
    current_page: u32,
    last_applied_page: u32,
    next_cursor: Option<String>,
    has_more: bool,
    loading: bool,
    in_flight: Option<PageRequest>,
    failed: Option<PageRequest>,
    error: Option<ApiError>,
    total_count: Option<u64>,
}

impl FeedAccumulator {
    /// Create an idle accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the feed at a target.
    ///
    /// Returns the page-1 request to perform when the target changed (or
    /// nothing is accumulated yet). Returns `None` when the key is already
    /// active with a non-empty accumulation - the restoration path that
    /// makes back-navigation instant - or when the first page is already
    /// outstanding.
    pub fn set_target_key(&mut self, key: FeedTargetKey) -> Option<PageRequest> {
        if self.active.as_ref() == Some(&key) {
            if !self.items.is_empty() {
                debug!(?key, "reusing cached accumulation, no fetch");
                return None;
            }
            if self.in_flight.is_some() {
                return None;
            }
        }

        self.active = Some(key.clone());
        self.items.clear();
        self.seen.clear();
        self.current_page = 1;
        self.last_applied_page = 0;
        self.next_cursor = None;
        self.has_more = true;
        self.loading = true;
        self.error = None;
        self.failed = None;
        self.total_count = None;

        let request = PageRequest { key, page: 1 };
        self.in_flight = Some(request.clone());
        Some(request)
    }

    /// Request the next page.
    ///
    /// No-op while a fetch is outstanding, when the feed is exhausted,
    /// before any target is set, or while a failed fetch is waiting on
    /// [`retry`](Self::retry). The last case matters for page 1: advancing
    /// past an unapplied failed page would drop its items for good.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.loading || !self.has_more || self.failed.is_some() {
            return None;
        }
        let key = self.active.clone()?;

        let request = PageRequest {
            key,
            page: self.current_page + 1,
        };
        if self.in_flight.as_ref() == Some(&request) {
            return None;
        }
        self.loading = true;
        self.in_flight = Some(request.clone());
        Some(request)
    }

    /// Re-issue the last failed page fetch (the user hit "retry").
    pub fn retry(&mut self) -> Option<PageRequest> {
        if self.loading {
            return None;
        }
        let request = self.failed.take()?;
        self.error = None;
        self.loading = true;
        self.in_flight = Some(request.clone());
        Some(request)
    }

    /// Apply the outcome of a previously issued request.
    ///
    /// Responses whose tag no longer matches the active key are silently
    /// discarded; this is the ordering-safety mechanism for out-of-order
    /// network completion. Failures keep the accumulated items visible and
    /// surface an error instead.
    pub fn apply(&mut self, request: &PageRequest, outcome: Result<Paginated<ProductRef>, ApiError>) {
        if self.active.as_ref() != Some(&request.key) {
            debug!(?request.key, "discarding stale feed response");
            return;
        }

        if self.in_flight.as_ref() == Some(request) {
            self.in_flight = None;
        }

        match outcome {
            Ok(page) => self.apply_page(request.page, page),
            Err(e) => {
                debug!(error = %e, page = request.page, "feed page fetch failed");
                self.loading = false;
                self.failed = Some(request.clone());
                self.error = Some(e);
            }
        }
    }

    fn apply_page(&mut self, page_number: u32, page: Paginated<ProductRef>) {
        if page_number == 1 {
            // First page replaces the accumulation wholesale.
            self.items.clear();
            self.seen.clear();
        } else if page_number <= self.last_applied_page {
            // Duplicate delivery of an already-applied page.
            debug!(page_number, "discarding already-applied feed page");
            return;
        }

        for item in page.results {
            if self.seen.insert(item.id) {
                self.items.push(item);
            }
        }

        self.current_page = page_number;
        self.last_applied_page = page_number;
        self.has_more = page.next.is_some();
        self.next_cursor = page.next;
        self.total_count = Some(page.count);
        self.loading = false;
        self.error = None;
        self.failed = None;
    }

    /// The accumulated items, in first-seen order.
    #[must_use]
    pub fn items(&self) -> &[ProductRef] {
        &self.items
    }

    /// The active target key, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&FeedTargetKey> {
        self.active.as_ref()
    }

    /// Whether the server reported another page. Derived solely from the
    /// presence of a next-page cursor.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a fetch is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Total result count the server reported, once known.
    #[must_use]
    pub const fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// The last fetch failure, if the feed is showing a retry affordance.
    #[must_use]
    pub const fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Current phase of the load cycle.
    #[must_use]
    pub fn phase(&self) -> FeedPhase {
        match (&self.active, self.loading, self.last_applied_page) {
            (None, _, _) => FeedPhase::Idle,
            (Some(_), true, 0) => FeedPhase::Fetching,
            (Some(_), true, _) => FeedPhase::FetchingMore,
            (Some(_), false, _) => FeedPhase::Loaded,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use tidepool_core::{CategoryId, CurrencyCode, Price};

    pub fn product(id: i64) -> ProductRef {
        ProductRef {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            price: Price::from_cents(999, CurrencyCode::USD),
            image: None,
        }
    }

    pub fn page(ids: &[i64], next: Option<&str>, count: u64) -> Paginated<ProductRef> {
        Paginated {
            count,
            next: next.map(str::to_owned),
            previous: None,
            results: ids.iter().copied().map(product).collect(),
        }
    }

    fn key(id: i64) -> FeedTargetKey {
        FeedTargetKey::category(CategoryId::new(id))
    }

    fn ids(feed: &FeedAccumulator) -> Vec<i64> {
        feed.items().iter().map(|p| p.id.as_i64()).collect()
    }

    #[test]
    fn test_first_page_replaces_and_terminates_without_cursor() {
        let mut feed = FeedAccumulator::new();
        let req = feed.set_target_key(key(1)).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(feed.phase(), FeedPhase::Fetching);

        feed.apply(&req, Ok(page(&[1, 2, 3], None, 3)));

        assert_eq!(ids(&feed), vec![1, 2, 3]);
        assert!(!feed.has_more());
        assert_eq!(feed.phase(), FeedPhase::Loaded);
        assert_eq!(feed.total_count(), Some(3));
        // Exhausted feed: load_more is a no-op.
        assert!(feed.load_more().is_none());
    }

    #[test]
    fn test_append_dedups_and_preserves_first_seen_order() {
        let mut feed = FeedAccumulator::new();
        let req1 = feed.set_target_key(key(1)).unwrap();
        feed.apply(&req1, Ok(page(&[1, 2], Some("c2"), 4)));

        let req2 = feed.load_more().unwrap();
        assert_eq!(req2.page, 2);
        feed.apply(&req2, Ok(page(&[2, 3, 1, 4], None, 4)));

        assert_eq!(ids(&feed), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reapplying_same_page_leaves_accumulation_unchanged() {
        let mut feed = FeedAccumulator::new();
        let req1 = feed.set_target_key(key(1)).unwrap();
        feed.apply(&req1, Ok(page(&[1, 2], Some("c2"), 4)));
        let req2 = feed.load_more().unwrap();
        feed.apply(&req2, Ok(page(&[3, 4], None, 4)));

        let before = ids(&feed);
        feed.apply(&req2, Ok(page(&[3, 4], None, 4)));
        assert_eq!(ids(&feed), before);
    }

    #[test]
    fn test_stale_response_for_departed_key_is_discarded() {
        let mut feed = FeedAccumulator::new();
        let req_a = feed.set_target_key(key(1)).unwrap();

        // User navigates to category B before A's response lands.
        let req_b = feed.set_target_key(key(2)).unwrap();
        feed.apply(&req_b, Ok(page(&[10, 11], None, 2)));

        // A's slow response arrives last and must not win.
        feed.apply(&req_a, Ok(page(&[1, 2, 3], None, 3)));

        assert_eq!(feed.target(), Some(&key(2)));
        assert_eq!(ids(&feed), vec![10, 11]);
    }

    #[test]
    fn test_restoration_path_reuses_cache_without_fetch() {
        let mut feed = FeedAccumulator::new();
        let req = feed.set_target_key(key(1)).unwrap();
        feed.apply(&req, Ok(page(&[1, 2], None, 2)));

        // Back navigation to the same key: reuse verbatim, no request.
        assert!(feed.set_target_key(key(1)).is_none());
        assert_eq!(ids(&feed), vec![1, 2]);
    }

    #[test]
    fn test_same_key_with_outstanding_first_page_does_not_refetch() {
        let mut feed = FeedAccumulator::new();
        let _req = feed.set_target_key(key(1)).unwrap();
        assert!(feed.set_target_key(key(1)).is_none());
    }

    #[test]
    fn test_load_more_noop_while_loading() {
        let mut feed = FeedAccumulator::new();
        let req = feed.set_target_key(key(1)).unwrap();
        assert!(feed.load_more().is_none());

        feed.apply(&req, Ok(page(&[1], Some("c2"), 3)));
        let more = feed.load_more().unwrap();
        assert_eq!(feed.phase(), FeedPhase::FetchingMore);
        // Second call while page 2 is outstanding: no-op.
        assert!(feed.load_more().is_none());
        feed.apply(&more, Ok(page(&[2], None, 3)));
        assert!(!feed.has_more());
    }

    #[test]
    fn test_empty_first_page_is_terminal_not_error() {
        let mut feed = FeedAccumulator::new();
        let req = feed.set_target_key(key(1)).unwrap();
        feed.apply(&req, Ok(page(&[], None, 0)));

        assert!(feed.items().is_empty());
        assert!(!feed.has_more());
        assert!(feed.error().is_none());
        assert_eq!(feed.phase(), FeedPhase::Loaded);
    }

    #[test]
    fn test_failed_fetch_keeps_items_and_offers_retry() {
        let mut feed = FeedAccumulator::new();
        let req1 = feed.set_target_key(key(1)).unwrap();
        feed.apply(&req1, Ok(page(&[1, 2], Some("c2"), 4)));

        let req2 = feed.load_more().unwrap();
        feed.apply(&req2, Err(ApiError::Validation("server error (502)".to_owned())));

        assert_eq!(ids(&feed), vec![1, 2]);
        assert!(feed.error().is_some());
        assert!(!feed.is_loading());

        let retried = feed.retry().unwrap();
        assert_eq!(retried, req2);
        assert!(feed.error().is_none());
        feed.apply(&retried, Ok(page(&[3], None, 3)));
        assert_eq!(ids(&feed), vec![1, 2, 3]);
    }

    #[test]
    fn test_load_more_noop_after_failed_first_page() {
        let mut feed = FeedAccumulator::new();
        let req1 = feed.set_target_key(key(1)).unwrap();
        feed.apply(&req1, Err(ApiError::Validation("server error (502)".to_owned())));

        // An automatic trigger (the visibility sentinel) must not advance
        // past the unapplied page; only retry may re-issue it.
        assert!(feed.load_more().is_none());

        let retried = feed.retry().unwrap();
        assert_eq!(retried.page, 1);
        feed.apply(&retried, Ok(page(&[1, 2, 3], Some("c2"), 6)));
        assert_eq!(ids(&feed), vec![1, 2, 3]);

        let more = feed.load_more().unwrap();
        assert_eq!(more.page, 2);
        feed.apply(&more, Ok(page(&[4, 5, 6], None, 6)));
        assert_eq!(ids(&feed), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_stale_error_does_not_poison_new_target() {
        let mut feed = FeedAccumulator::new();
        let req_a = feed.set_target_key(key(1)).unwrap();
        let req_b = feed.set_target_key(key(2)).unwrap();

        feed.apply(&req_a, Err(ApiError::Unauthorized));
        assert!(feed.error().is_none());
        assert!(feed.is_loading());

        feed.apply(&req_b, Ok(page(&[5], None, 1)));
        assert_eq!(ids(&feed), vec![5]);
    }
}
