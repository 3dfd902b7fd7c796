//! Guest-to-authenticated reconciliation.

use tracing::{info, instrument, warn};

use super::{CartStore, WishlistStore};
use crate::api::{CartApi, WishlistApi};
use crate::auth::AuthFlag;

/// Edge-triggered reconciler for the login transition.
///
/// On the first observation after a guest session becomes authenticated it
/// replaces both local collections with the server's - the guest-local cart
/// and wishlist are discarded, not merged. A union merge is equally
/// defensible, and this struct is the single place to implement one.
///
/// A logout resets the guard so the next login reconciles again. The two
/// fetches are independent: a failed wishlist fetch neither blocks nor
/// rolls back a successful cart fetch.
#[derive(Debug, Default)]
pub struct LoginReconciler {
    reconciled: bool,
}

impl LoginReconciler {
    /// Create a reconciler that has not yet fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the current authenticated session has been reconciled.
    #[must_use]
    pub const fn has_reconciled(&self) -> bool {
        self.reconciled
    }

    /// Observe the current authentication state and reconcile on the
    /// guest-to-authenticated edge. Call whenever the flag may have changed.
    #[instrument(skip_all)]
    pub async fn observe<CA: CartApi, WA: WishlistApi>(
        &mut self,
        auth: &AuthFlag,
        cart: &mut CartStore<CA>,
        wishlist: &mut WishlistStore<WA>,
    ) {
        if !auth.is_authenticated() {
            // Logout re-arms the one-shot guard.
            self.reconciled = false;
            return;
        }
        if self.reconciled {
            return;
        }
        self.reconciled = true;
        info!("authenticated, replacing local collections with server state");

        if let Err(e) = cart.refresh().await {
            warn!(error = %e, "cart reconciliation fetch failed");
        }
        if let Err(e) = wishlist.refresh().await {
            warn!(error = %e, "wishlist reconciliation fetch failed");
        }
    }
}
