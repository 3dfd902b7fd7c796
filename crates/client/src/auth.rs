//! Shared authentication flag.
//!
//! The stores derive their mode (guest-local vs server-authoritative) from
//! this flag on every command instead of storing a mode of their own, so the
//! two can never drift apart. The login/logout collaborator owns the flag's
//! transitions; the engine only reads it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cheaply cloneable handle to the session's authentication state.
#[derive(Debug, Clone, Default)]
pub struct AuthFlag {
    authenticated: Arc<AtomicBool>,
}

impl AuthFlag {
    /// Create a flag in the guest (unauthenticated) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the session is currently authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Relaxed)
    }

    /// Record a login or logout transition.
    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::Relaxed);
    }
}
