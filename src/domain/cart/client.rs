//! Cart sub-client: optimistic add/remove/update, direct clear.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::api::StorefrontApi;
use crate::client::StorefrontClient;
use crate::domain::cart::state::{self, AddOutcome, CartTotals, LineSync};
use crate::domain::cart::wire::{AddToCartRequest, RemoveFromCartRequest, UpdateQuantityRequest};
use crate::domain::cart::{AddToCart, CartLine, LineKey};
use crate::domain::order::CheckoutSummary;
use crate::error::SdkError;
use crate::shared::LineId;
use crate::sync::{Keyed, OnFailure, Snapshot};

/// Sub-client for the cart.
///
/// Mutations apply to the local lines immediately and return; the backend
/// call follows after a short debounce. Failures roll the lines back and
/// surface as an error notice.
pub struct Cart<'a, A: StorefrontApi> {
    pub(crate) client: &'a StorefrontClient<A>,
}

impl<'a, A: StorefrontApi> Cart<'a, A> {
    // ── Reads ────────────────────────────────────────────────────────────

    pub fn lines(&self) -> Vec<CartLine> {
        self.client.cart.store().items()
    }

    pub fn line(&self, id: &LineId) -> Option<CartLine> {
        self.client
            .cart
            .store()
            .read(|lines| lines.iter().find(|l| &l.id == id).cloned())
    }

    pub fn totals(&self) -> CartTotals {
        self.client.cart.store().read(CartTotals::of)
    }

    pub fn checkout_summary(&self) -> CheckoutSummary {
        self.client
            .cart
            .store()
            .read(|lines| CheckoutSummary::from_cart(lines, &self.client.shipping))
    }

    pub fn is_loading(&self) -> bool {
        self.client.cart.store().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<CartLine>> {
        self.client.cart.store().subscribe()
    }

    /// Wait until every scheduled cart call has completed.
    pub async fn settled(&self) {
        self.client.cart.pending().settled().await;
    }

    // ── Fetch ────────────────────────────────────────────────────────────

    /// Replace the lines with the server's. A no-op without a session.
    pub async fn refresh(&self) -> Result<(), SdkError> {
        if !self.client.is_signed_in().await {
            return Ok(());
        }
        let store = self.client.cart.store();
        let ticket = store.begin_fetch();
        match self.client.api.fetch_cart().await {
            Ok(lines) => {
                store.finish_fetch(ticket, Some(lines));
                Ok(())
            }
            Err(e) => {
                store.finish_fetch(ticket, None);
                Err(e)
            }
        }
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// Add `item`, merging with an existing line of the same product, size
    /// and color. Returns the id of the affected line (temporary until the
    /// server confirms a new line).
    ///
    /// Clicks within the add debounce window are sent as one call carrying
    /// their summed quantity.
    pub async fn add(&self, item: AddToCart) -> Result<LineId, SdkError> {
        self.client.require_session().await?;

        let key = item.line_key();
        let outcome = self
            .schedule(
                &key,
                |lines| state::apply_add(lines, &item),
                self.client.sync.add_debounce,
            )
            .map_err(|e| self.refused(e))?;

        if let AddOutcome::Incremented { previous, .. } = &outcome {
            tracing::debug!(key = %key.sync_key(), previous, "Incremented cart line");
        }
        Ok(outcome.line_id().clone())
    }

    /// Remove a line. Returns `false` (and calls nothing) if no such line.
    ///
    /// A line whose add has not been sent yet is dropped locally and the
    /// server never hears of it.
    pub async fn remove(&self, id: &LineId) -> Result<bool, SdkError> {
        self.client.require_session().await?;

        let Some(line) = self.line(id) else {
            return Ok(false);
        };
        let id = id.clone();
        self.schedule(
            &line.line_key(),
            move |lines| Ok(state::apply_remove(lines, &id).is_some()),
            self.client.sync.remove_debounce,
        )
    }

    /// Set a line's quantity (1–6). Rapid changes collapse into one call
    /// carrying the last value.
    pub async fn update_quantity(&self, id: &LineId, quantity: u32) -> Result<(), SdkError> {
        self.client.require_session().await?;

        let key = self
            .line(id)
            .map(|l| l.line_key())
            .ok_or_else(|| SdkError::Other(format!("Cart line not found: {}", id)))?;
        let id = id.clone();
        self.schedule(
            &key,
            move |lines| state::apply_quantity(lines, &id, quantity).map(|_| ()),
            self.client.sync.update_debounce,
        )
        .map_err(|e| self.refused(e))
    }

    /// One more of this line. Fails with `QuantityLimit` at the cap.
    pub async fn increment(&self, id: &LineId) -> Result<(), SdkError> {
        let current = self.quantity_of(id)?;
        self.update_quantity(id, current + 1).await
    }

    /// One fewer of this line; removes it when the last unit goes.
    pub async fn decrement(&self, id: &LineId) -> Result<(), SdkError> {
        let current = self.quantity_of(id)?;
        if current <= 1 {
            self.remove(id).await.map(|_| ())
        } else {
            self.update_quantity(id, current - 1).await
        }
    }

    /// Empty the cart. Sent immediately, not debounced; calling it on an
    /// empty cart is harmless.
    ///
    /// Calls already on the wire are awaited first, so none of them can
    /// land on the server after the clear.
    pub async fn clear(&self) -> Result<(), SdkError> {
        self.client.require_session().await?;

        let cart = &self.client.cart;
        self.clear_local().await;
        let epoch = cart.store().epoch();

        match self.client.api.clear_cart().await {
            Ok(()) => {
                if cart.pending().is_empty() {
                    cart.store().adopt_confirmed(epoch);
                }
                Ok(())
            }
            Err(e) if e.is_aborted() => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "Clearing cart failed, resyncing");
                self.client.notifier.error(e.user_message());
                cart.resync_now().await;
                Err(e)
            }
        }
    }

    /// Drop local lines and anything scheduled, without calling the server,
    /// which is taken to hold an empty cart from here on. Returns once the
    /// calls already running have completed; their responses are discarded.
    pub(crate) async fn clear_local(&self) {
        let cart = &self.client.cart;
        let in_flight = cart.pending().cancel_all();
        cart.store().invalidate();
        cart.store().confirm(cart.store().epoch(), Vec::new());
        cart.store().modify(|lines| lines.clear());
        in_flight.wait().await;
    }

    /// Apply `local` now and schedule a sync of the line under its key.
    ///
    /// When the call fires it compares the local line with the one the
    /// server last confirmed and sends the difference, if any: an add for a
    /// line the server lacks, a quantity update, or a remove. Whatever the
    /// user did last is what the server ends up with.
    fn schedule<R>(
        &self,
        key: &LineKey,
        local: impl FnOnce(&mut Vec<CartLine>) -> Result<R, SdkError>,
        debounce: Duration,
    ) -> Result<R, SdkError> {
        let cart = &self.client.cart;
        // A line the server has never seen, with no earlier call that could
        // be creating it, fails by simply disappearing.
        let unknown = !cart.pending().is_pending(&key.sync_key())
            && !cart
                .store()
                .read_confirmed(|confirmed| confirmed.iter().any(|l| l.matches(key)));
        let on_failure = if unknown {
            let key = key.clone();
            OnFailure::discard(move |lines: &mut Vec<CartLine>| {
                lines.retain(|l| !(l.matches(&key) && l.is_provisional()))
            })
        } else {
            OnFailure::Resync
        };

        let api = Arc::clone(&self.client.api);
        let store = Arc::clone(cart.store());
        let line_key = key.clone();
        let remote = move || async move {
            let change = store.read(|lines| {
                store.read_confirmed(|confirmed| state::diff_line(lines, confirmed, &line_key))
            });
            tracing::debug!(key = %line_key.sync_key(), change = ?change, "Syncing cart line");
            match change {
                LineSync::Unchanged => Ok(None),
                LineSync::Add(line) => {
                    let request = AddToCartRequest::from(&line);
                    api.add_to_cart(&request).await.map(Some)
                }
                LineSync::Update(quantity) => {
                    let request = UpdateQuantityRequest::new(&line_key, quantity);
                    api.update_cart_quantity(&request).await.map(Some)
                }
                LineSync::Remove => {
                    let request = RemoveFromCartRequest::from(&line_key);
                    api.remove_from_cart(&request).await.map(Some)
                }
            }
        };

        cart.apply(key.sync_key(), local, remote, debounce, on_failure)
    }

    /// Surface a locally refused change (quantity cap, bad quantity).
    fn refused(&self, e: SdkError) -> SdkError {
        if matches!(e, SdkError::QuantityLimit { .. } | SdkError::Validation(_)) {
            tracing::debug!(error = %e, "Cart change refused");
            self.client.notifier.error(e.user_message());
        }
        e
    }

    fn quantity_of(&self, id: &LineId) -> Result<u32, SdkError> {
        self.line(id)
            .map(|l| l.quantity)
            .ok_or_else(|| SdkError::Other(format!("Cart line not found: {}", id)))
    }
}
