//! Async driver for a feed accumulator.

use tracing::instrument;

use tidepool_core::FeedTargetKey;

use super::{FeedAccumulator, PageRequest};
use crate::api::CatalogApi;

/// Owns one [`FeedAccumulator`] and performs its page requests against a
/// catalog API. One instance exists per feed surface (category listing,
/// search results) and outlives view teardown, which is what lets a
/// revisited feed restore instantly.
pub struct FeedController<C> {
    api: C,
    feed: FeedAccumulator,
}

impl<C: CatalogApi> FeedController<C> {
    /// Create an idle controller.
    pub fn new(api: C) -> Self {
        Self {
            api,
            feed: FeedAccumulator::new(),
        }
    }

    /// Show a feed target, fetching page 1 unless the accumulator can
    /// restore a cached accumulation. Returns whether the restoration path
    /// was taken (the caller uses this to decide on scroll restoration).
    #[instrument(skip(self))]
    pub async fn show(&mut self, key: FeedTargetKey) -> bool {
        match self.feed.set_target_key(key) {
            Some(request) => {
                self.perform(request).await;
                false
            }
            None => true,
        }
    }

    /// Fetch the next page, if one is due.
    #[instrument(skip(self))]
    pub async fn load_more(&mut self) {
        if let Some(request) = self.feed.load_more() {
            self.perform(request).await;
        }
    }

    /// Re-issue the last failed fetch.
    #[instrument(skip(self))]
    pub async fn retry(&mut self) {
        if let Some(request) = self.feed.retry() {
            self.perform(request).await;
        }
    }

    /// Read access for rendering (items, `has_more`, phase, error).
    #[must_use]
    pub const fn feed(&self) -> &FeedAccumulator {
        &self.feed
    }

    async fn perform(&mut self, request: PageRequest) {
        let outcome = self.api.fetch_products(&request.key, request.page).await;
        self.feed.apply(&request, outcome);
    }
}
