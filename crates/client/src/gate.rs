//! Deferred actions behind an authentication prompt.
//!
//! Some actions (checkout, writing a review) require an account. The gate
//! runs them immediately for an authenticated user; for a guest it parks
//! the action, tells the caller to raise the login prompt, and resumes the
//! action once the prompt resolves. Exactly one action can be parked - the
//! gate mirrors a single modal, not a queue - so a second `guard` before
//! resolution replaces the first.

use tracing::debug;

use crate::auth::AuthFlag;

/// A parked user action.
type PendingAction = Box<dyn FnOnce() + Send>;

/// What `guard` did with the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The user was authenticated; the action ran synchronously.
    Executed,
    /// The action is parked; the caller should raise the login prompt.
    LoginRequired,
}

/// Single-slot deferred action gate.
pub struct ActionGate {
    auth: AuthFlag,
    pending: Option<PendingAction>,
}

impl ActionGate {
    /// Create a gate over the shared authentication flag.
    #[must_use]
    pub fn new(auth: AuthFlag) -> Self {
        Self {
            auth,
            pending: None,
        }
    }

    /// Run `action` now if authenticated, otherwise park it (replacing any
    /// previously parked action) and ask the caller to prompt for login.
    pub fn guard<F: FnOnce() + Send + 'static>(&mut self, action: F) -> GateOutcome {
        if self.auth.is_authenticated() {
            action();
            return GateOutcome::Executed;
        }
        if self.pending.is_some() {
            debug!("replacing previously deferred action");
        }
        self.pending = Some(Box::new(action));
        GateOutcome::LoginRequired
    }

    /// The prompt resolved (login succeeded, or the user chose to continue
    /// as guest): run the parked action exactly once and clear it. Returns
    /// whether an action ran.
    pub fn resume(&mut self) -> bool {
        match self.pending.take() {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }

    /// The prompt was dismissed: drop the parked action without running it.
    pub fn dismiss(&mut self) {
        self.pending = None;
    }

    /// Whether an action is waiting on the prompt.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
