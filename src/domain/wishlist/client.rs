//! Wishlist sub-client.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::StorefrontApi;
use crate::client::StorefrontClient;
use crate::domain::cart::ProductSnapshot;
use crate::domain::wishlist::wire::AddToWishlistRequest;
use crate::domain::wishlist::{self, state, WishlistEntry};
use crate::error::SdkError;
use crate::shared::ProductId;
use crate::sync::{Keyed, OnFailure, Snapshot};

/// Sub-client for the wishlist.
pub struct Wishlist<'a, A: StorefrontApi> {
    pub(crate) client: &'a StorefrontClient<A>,
}

impl<'a, A: StorefrontApi> Wishlist<'a, A> {
    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.client.wishlist.store().items()
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.client
            .wishlist
            .store()
            .read(|entries| state::contains(entries, product_id))
    }

    pub fn len(&self) -> usize {
        self.client.wishlist.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.client.wishlist.store().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<WishlistEntry>> {
        self.client.wishlist.store().subscribe()
    }

    /// Wait until every scheduled wishlist call has completed.
    pub async fn settled(&self) {
        self.client.wishlist.pending().settled().await;
    }

    /// Replace the entries with the server's. A no-op without a session.
    pub async fn refresh(&self) -> Result<(), SdkError> {
        if !self.client.is_signed_in().await {
            return Ok(());
        }
        let store = self.client.wishlist.store();
        let ticket = store.begin_fetch();
        let result = self.client.api.fetch_wishlist().await;
        match result {
            Ok(entries) => {
                store.finish_fetch(ticket, Some(entries));
                Ok(())
            }
            Err(e) => {
                store.finish_fetch(ticket, None);
                Err(e)
            }
        }
    }

    /// Save a product. Returns `false` if it was already saved.
    pub async fn add(&self, product: ProductSnapshot) -> Result<bool, SdkError> {
        self.client.require_session().await?;

        if self.contains(&product.product_id) {
            return Ok(false);
        }
        let local_product = product.clone();
        let discard_id = product.product_id.clone();
        self.schedule(
            product,
            move |entries| Ok(state::apply_add(entries, &local_product).is_some()),
            self.client.sync.add_debounce,
            OnFailure::discard(move |entries: &mut Vec<WishlistEntry>| {
                entries.retain(|e| !(e.product_id == discard_id && e.is_provisional()))
            }),
        )
    }

    /// Unsave a product. Returns `false` if it was not saved.
    pub async fn remove(&self, product_id: &ProductId) -> Result<bool, SdkError> {
        self.client.require_session().await?;

        let Some(entry) = self
            .client
            .wishlist
            .store()
            .read(|entries| entries.iter().find(|e| &e.product_id == product_id).cloned())
        else {
            return Ok(false);
        };
        let snapshot = ProductSnapshot {
            product_id: entry.product_id.clone(),
            name: entry.name.clone(),
            price: entry.price,
            image: entry.image.clone(),
            category: entry.category.clone(),
        };
        let product_id = product_id.clone();
        self.schedule(
            snapshot,
            move |entries| Ok(state::apply_remove(entries, &product_id).is_some()),
            self.client.sync.remove_debounce,
            OnFailure::Resync,
        )
    }

    /// Save if not saved, unsave otherwise. Returns whether the product is
    /// saved afterwards.
    pub async fn toggle(&self, product: ProductSnapshot) -> Result<bool, SdkError> {
        if self.contains(&product.product_id) {
            let product_id = product.product_id.clone();
            self.remove(&product_id).await.map(|_| false)
        } else {
            self.add(product).await.map(|_| true)
        }
    }

    /// Empty the wishlist. Sent immediately, not debounced, once the calls
    /// already on the wire have completed.
    pub async fn clear(&self) -> Result<(), SdkError> {
        self.client.require_session().await?;

        let wishlist = &self.client.wishlist;
        let in_flight = wishlist.pending().cancel_all();
        wishlist.store().invalidate();
        let epoch = wishlist.store().epoch();
        wishlist.store().confirm(epoch, Vec::new());
        wishlist.store().modify(|entries| entries.clear());
        // Nothing already sent may land after the clear.
        in_flight.wait().await;

        match self.client.api.clear_wishlist().await {
            Ok(()) => {
                if wishlist.pending().is_empty() {
                    wishlist.store().adopt_confirmed(epoch);
                }
                Ok(())
            }
            Err(e) if e.is_aborted() => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "Clearing wishlist failed, resyncing");
                self.client.notifier.error(e.user_message());
                wishlist.resync_now().await;
                Err(e)
            }
        }
    }

    /// Apply `local` now and schedule a sync of `product` under its key.
    ///
    /// When the call fires it compares what the user now wants (local
    /// entries) with what the server last confirmed, and sends the
    /// difference, if any. An add followed by a remove within the window
    /// sends nothing.
    fn schedule(
        &self,
        product: ProductSnapshot,
        local: impl FnOnce(&mut Vec<WishlistEntry>) -> Result<bool, SdkError>,
        debounce: std::time::Duration,
        on_failure: OnFailure<WishlistEntry>,
    ) -> Result<bool, SdkError> {
        let opt = &self.client.wishlist;
        let key = wishlist::sync_key(&product.product_id);
        let api = Arc::clone(&self.client.api);
        let store = Arc::clone(opt.store());

        let remote = move || async move {
            let pid = &product.product_id;
            let wanted = store.read(|entries| state::contains(entries, pid));
            let saved = store.read_confirmed(|entries| state::contains(entries, pid));
            match (wanted, saved) {
                (true, false) => {
                    let request = AddToWishlistRequest::from(&product);
                    api.add_to_wishlist(&request).await.map(Some)
                }
                (false, true) => api.remove_from_wishlist(pid).await.map(Some),
                _ => Ok(None),
            }
        };

        opt.apply(key, local, remote, debounce, on_failure)
    }
}
