//! Scroll position snapshot and restore.
//!
//! When the user leaves a feed view, the vertical offset is captured under
//! the view's route key; when they navigate back and the feed restored a
//! cached accumulation, the view scrolls to the captured offset. Layout is
//! still shifting right after first paint (images decode, fonts swap), so
//! a single scroll attempt lands short: the restore runs on a short
//! schedule instead - immediately, after the next paint, and once more
//! after a brief delay.
//!
//! While a [`ScrollSession`] is alive, the host's native scroll restoration
//! is disabled so two mechanisms never fight over the position; ending the
//! session re-enables it.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

/// The restore attempt schedule: immediately, after roughly one frame, and
/// after layout has had a moment to settle.
pub const RESTORE_SCHEDULE: [Duration; 3] = [
    Duration::ZERO,
    Duration::from_millis(16),
    Duration::from_millis(120),
];

/// The host viewport, as far as this module is concerned.
pub trait ScrollSurface {
    /// Scroll to a vertical offset in pixels.
    fn scroll_to(&mut self, offset_px: u32);

    /// Enable or disable the host's own scroll restoration.
    fn set_native_restoration(&mut self, enabled: bool);
}

/// Session-scoped scroll snapshots, at most one per route key.
#[derive(Debug, Default)]
pub struct ScrollMemory {
    snapshots: HashMap<String, u32>,
}

impl ScrollMemory {
    /// Create an empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the offset on leaving a view, overwriting any prior snapshot
    /// for the route key.
    pub fn depart(&mut self, route_key: &str, offset_px: u32) {
        self.snapshots.insert(route_key.to_owned(), offset_px);
    }

    /// The offset to restore on (re-)entering a view, or `None` when the
    /// view should open at the top - because the feed was fetched fresh
    /// rather than restored, no snapshot exists, or the snapshot is zero.
    /// Opening at the top is the default, not an error.
    #[must_use]
    pub fn enter(&self, route_key: &str, feed_restored: bool) -> Option<u32> {
        if !feed_restored {
            return None;
        }
        match self.snapshots.get(route_key).copied() {
            Some(0) | None => None,
            Some(offset) => Some(offset),
        }
    }

    /// Drop the snapshot for a route key.
    pub fn forget(&mut self, route_key: &str) {
        self.snapshots.remove(route_key);
    }
}

/// Scoped ownership of the viewport for one feed view's lifetime.
///
/// Beginning a session disables native restoration; [`ScrollSession::end`]
/// re-enables it and hands the surface back.
pub struct ScrollSession<S: ScrollSurface> {
    surface: S,
}

impl<S: ScrollSurface> ScrollSession<S> {
    /// Take over the viewport for the lifetime of a feed view.
    pub fn begin(mut surface: S) -> Self {
        surface.set_native_restoration(false);
        Self { surface }
    }

    /// Run the restore schedule toward `offset_px`.
    ///
    /// Each attempt re-issues the scroll so the position converges even as
    /// asynchronous layout keeps shifting underneath it.
    pub async fn restore(&mut self, offset_px: u32) {
        debug!(offset_px, "restoring scroll position");
        for (i, delay) in RESTORE_SCHEDULE.iter().enumerate() {
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
            debug!(attempt = i + 1, "scroll restore attempt");
            self.surface.scroll_to(offset_px);
        }
    }

    /// Tear the view down: re-enable native restoration and return the
    /// surface.
    pub fn end(mut self) -> S {
        self.surface.set_native_restoration(true);
        self.surface
    }
}
