//! Visibility sentinel for infinite scroll.
//!
//! The rendered list ends with an invisible sentinel element; when it
//! scrolls into view, the feed should load its next page. The host's
//! intersection observer (or equivalent) reports raw visibility here, and
//! this type turns it into an edge trigger: one `load_more` per
//! hidden-to-visible transition, so a sentinel that stays visible while a
//! short page renders does not hammer the feed. This is the only automatic
//! trigger - there is no time- or scroll-distance-based one.

/// Edge-triggered load-more sentinel.
#[derive(Debug, Default)]
pub struct LoadMoreSentinel {
    visible: bool,
}

impl LoadMoreSentinel {
    /// Create a sentinel that starts hidden.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the sentinel's current visibility. Returns `true` exactly on
    /// the hidden-to-visible transition, when the caller should invoke
    /// `load_more` on its feed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let fire = visible && !self.visible;
        self.visible = visible;
        fire
    }

    /// Whether the sentinel is currently visible.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }
}
