//! High-level client: `StorefrontClient` with nested sub-client accessors.
//!
//! The client owns every store. Each domain has its own sub-client in
//! `domain/<name>/client.rs`; this module keeps the builder, the session
//! lifecycle and the accessor methods.

use crate::api::StorefrontApi;
use crate::domain::address::client::Addresses;
use crate::domain::address::Address;
use crate::domain::cart::client::Cart;
use crate::domain::cart::CartLine;
use crate::domain::order::client::Orders;
use crate::domain::order::{Order, ShippingPolicy};
use crate::domain::product::client::Products;
use crate::domain::product::Product;
use crate::domain::wishlist::client::Wishlist;
use crate::domain::wishlist::WishlistEntry;
use crate::error::{AuthError, SdkError};
use crate::notice::{Notice, Notifier, SignInPrompt};
use crate::session::Session;
use crate::shared::ProductId;
use crate::sync::optimistic::Resync;
use crate::sync::{Optimistic, Store, SyncConfig};

use async_lock::RwLock;
use futures_util::future::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

#[cfg(feature = "http")]
use crate::http::StorefrontHttp;

// Re-export sub-client types for convenience.
pub use crate::domain::address::client::Addresses as AddressesClient;
pub use crate::domain::cart::client::Cart as CartClient;
pub use crate::domain::order::client::Orders as OrdersClient;
pub use crate::domain::product::client::Products as ProductsClient;
pub use crate::domain::wishlist::client::Wishlist as WishlistClient;

/// A client talking to the REST backend.
#[cfg(feature = "http")]
pub type HttpStorefrontClient = StorefrontClient<StorefrontHttp>;

/// The primary entry point.
///
/// Provides nested sub-client accessors for each domain:
/// `client.cart()`, `client.wishlist()`, etc. Stores start empty; call
/// [`sign_in`](Self::sign_in) to hydrate them.
pub struct StorefrontClient<A: StorefrontApi> {
    pub(crate) api: Arc<A>,
    pub(crate) session: Arc<RwLock<Option<Session>>>,
    pub(crate) notifier: Notifier,
    pub(crate) sync: SyncConfig,
    pub(crate) shipping: ShippingPolicy,
    pub(crate) cart: Optimistic<CartLine>,
    pub(crate) wishlist: Optimistic<WishlistEntry>,
    pub(crate) addresses: Arc<Store<Address>>,
    pub(crate) orders: Arc<Store<Order>>,
    /// Product cache: id → (Product, fetched_at)
    pub(crate) product_cache: Arc<RwLock<HashMap<ProductId, (Product, Instant)>>>,
    pub(crate) product_cache_ttl: Duration,
}

impl<A: StorefrontApi> StorefrontClient<A> {
    pub fn builder() -> StorefrontClientBuilder {
        StorefrontClientBuilder::default()
    }

    /// A client over any `StorefrontApi`, with default settings.
    pub fn with_api(api: A) -> Self {
        StorefrontClientBuilder::default().build_with(api)
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn cart(&self) -> Cart<'_, A> {
        Cart { client: self }
    }

    pub fn wishlist(&self) -> Wishlist<'_, A> {
        Wishlist { client: self }
    }

    pub fn addresses(&self) -> Addresses<'_, A> {
        Addresses { client: self }
    }

    pub fn orders(&self) -> Orders<'_, A> {
        Orders { client: self }
    }

    pub fn products(&self) -> Products<'_, A> {
        Products { client: self }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    // ── Notices ──────────────────────────────────────────────────────────

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    // ── Session ──────────────────────────────────────────────────────────

    /// The current session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .map(Session::is_active)
            .unwrap_or(false)
    }

    /// Start a session and hydrate every store from the server.
    ///
    /// Switching users empties the stores first. Hydration failures are
    /// logged and surfaced as an error notice; the session stays active.
    pub async fn sign_in(&self, session: Session) -> Result<(), SdkError> {
        if !session.is_active() {
            return Err(AuthError::SessionExpired.into());
        }

        let previous = self.session.read().await.as_ref().map(|s| s.user_id.clone());
        if previous.as_deref().is_some_and(|p| p != session.user_id) {
            tracing::debug!("Switching user, clearing stores");
            self.reset_stores();
        }

        self.api.set_auth_token(Some(session.token.clone())).await;
        tracing::debug!(user_id = %session.user_id, "Signed in");
        *self.session.write().await = Some(session);

        self.hydrate().await;
        Ok(())
    }

    /// End the session: cancel scheduled mutations and empty every store.
    pub async fn sign_out(&self) {
        self.reset_stores();
        self.api.set_auth_token(None).await;
        *self.session.write().await = None;
        tracing::debug!("Signed out");
    }

    /// Refetch every user-scoped store concurrently.
    pub async fn hydrate(&self) {
        let (cart_client, wishlist_client, addresses_client, orders_client) =
            (self.cart(), self.wishlist(), self.addresses(), self.orders());
        let (cart, wishlist, addresses, orders) = futures_util::join!(
            cart_client.refresh(),
            wishlist_client.refresh(),
            addresses_client.refresh(),
            orders_client.refresh(),
        );

        let failures: Vec<(&str, SdkError)> = [
            ("cart", cart.err()),
            ("wishlist", wishlist.err()),
            ("addresses", addresses.err()),
            ("orders", orders.err()),
        ]
        .into_iter()
        .filter_map(|(domain, err)| err.filter(|e| !e.is_aborted()).map(|e| (domain, e)))
        .collect();

        for (domain, e) in &failures {
            tracing::warn!(domain, error = %e, "Hydration failed");
        }
        if let Some((_, e)) = failures.first() {
            self.notifier.error(e.user_message());
        }
    }

    fn reset_stores(&self) {
        self.cart.reset();
        self.wishlist.reset();
        self.addresses.reset();
        self.orders.reset();
    }

    /// Gate for every mutating operation. Without an active session nothing
    /// mutates and the user is prompted to sign in.
    pub(crate) async fn require_session(&self) -> Result<(), SdkError> {
        let err = match self.session.read().await.as_ref() {
            Some(s) if s.is_active() => return Ok(()),
            Some(_) => AuthError::SessionExpired,
            None => AuthError::NotAuthenticated,
        };
        tracing::debug!(error = %err, "Mutation blocked, sign-in required");
        self.notifier.prompt_sign_in();
        Err(err.into())
    }

    /// Clear all product caches.
    pub async fn clear_all_caches(&self) {
        self.product_cache.write().await.clear();
    }
}

impl<A: StorefrontApi> std::fmt::Debug for StorefrontClient<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("sync", &self.sync)
            .field("shipping", &self.shipping)
            .field("cart_lines", &self.cart.store().len())
            .field("wishlist_entries", &self.wishlist.store().len())
            .finish_non_exhaustive()
    }
}

fn resync_cart<A: StorefrontApi>(api: &Arc<A>) -> Resync<CartLine> {
    let api = Arc::clone(api);
    Arc::new(move || {
        let api = Arc::clone(&api);
        async move { api.fetch_cart().await }.boxed()
    })
}

fn resync_wishlist<A: StorefrontApi>(api: &Arc<A>) -> Resync<WishlistEntry> {
    let api = Arc::clone(api);
    Arc::new(move || {
        let api = Arc::clone(&api);
        async move { api.fetch_wishlist().await }.boxed()
    })
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct StorefrontClientBuilder {
    base_url: String,
    sync: SyncConfig,
    shipping: ShippingPolicy,
    sign_in_prompt: Option<SignInPrompt>,
    product_cache_ttl: Duration,
}

impl Default for StorefrontClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            sync: SyncConfig::default(),
            shipping: ShippingPolicy::default(),
            sign_in_prompt: None,
            product_cache_ttl: Duration::from_secs(60),
        }
    }
}

impl StorefrontClientBuilder {
    /// Defaults, with the base URL taken from `STOREFRONT_API_URL` when set.
    pub fn from_env() -> Self {
        let builder = Self::default();
        match std::env::var(crate::network::API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => builder.base_url(url.trim()),
            _ => builder,
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn sync_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    pub fn shipping_policy(mut self, shipping: ShippingPolicy) -> Self {
        self.shipping = shipping;
        self
    }

    /// Called whenever a mutation is blocked for lack of a session.
    pub fn on_sign_in_required(mut self, prompt: impl Fn() + Send + Sync + 'static) -> Self {
        self.sign_in_prompt = Some(Arc::new(prompt));
        self
    }

    pub fn product_cache_ttl(mut self, ttl: Duration) -> Self {
        self.product_cache_ttl = ttl;
        self
    }

    #[cfg(feature = "http")]
    pub fn build(self) -> Result<StorefrontClient<StorefrontHttp>, SdkError> {
        let http = StorefrontHttp::new(&self.base_url)?;
        Ok(self.build_with(http))
    }

    /// Build over a caller-supplied `StorefrontApi`. The base URL is unused.
    pub fn build_with<A: StorefrontApi>(self, api: A) -> StorefrontClient<A> {
        let api = Arc::new(api);
        let notifier = Notifier::new(self.sign_in_prompt);

        let cart = Optimistic::new(
            "cart",
            Arc::new(Store::new()),
            notifier.clone(),
            resync_cart(&api),
        );
        let wishlist = Optimistic::new(
            "wishlist",
            Arc::new(Store::new()),
            notifier.clone(),
            resync_wishlist(&api),
        );

        StorefrontClient {
            api,
            session: Arc::new(RwLock::new(None)),
            notifier,
            sync: self.sync,
            shipping: self.shipping,
            cart,
            wishlist,
            addresses: Arc::new(Store::new()),
            orders: Arc::new(Store::new()),
            product_cache: Arc::new(RwLock::new(HashMap::new())),
            product_cache_ttl: self.product_cache_ttl,
        }
    }
}
