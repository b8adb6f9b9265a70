//! # Storefront SDK
//!
//! Client-side state for an apparel storefront: an optimistic cart and
//! wishlist, saved addresses, orders and the product catalog, all kept in
//! sync with the storefront REST backend.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core**: Newtypes, domain models, validation (no I/O)
//! 2. **Sync**: Reactive stores, debounced pending mutations, optimistic apply/rollback
//! 3. **HTTP API**: `StorefrontHttp` implementing `StorefrontApi` with per-endpoint retry policies
//! 4. **High-Level Client**: `StorefrontClient` with nested sub-clients, session lifecycle and caching
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront_sdk::prelude::*;
//!
//! let client = StorefrontClientBuilder::from_env().build()?;
//! client.sign_in(Session::new("user_123", token)).await?;
//!
//! let line = client.cart().add(AddToCart::new(snapshot, "M", "Black", 1)).await?;
//! client.cart().update_quantity(&line, 3).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and money.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants.
pub mod network;

/// Client-side form validation.
pub mod validation;

/// Persisted user preferences.
pub mod prefs;

// ── Layer 2: Sync ────────────────────────────────────────────────────────────

/// Reactive stores and the pending-mutation table.
pub mod sync;

/// User-facing notices.
pub mod notice;

/// Signed-in identity.
pub mod session;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// The backend surface the stores are driven by.
pub mod api;

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `StorefrontClient`: the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{LineId, Money, ProductId};

    // Domain types: cart
    pub use crate::domain::cart::state::CartTotals;
    pub use crate::domain::cart::{AddToCart, CartLine, ProductSnapshot, MAX_LINE_QUANTITY};

    // Domain types: wishlist
    pub use crate::domain::wishlist::WishlistEntry;

    // Domain types: address
    pub use crate::domain::address::{Address, AddressDraft};

    // Domain types: order
    pub use crate::domain::order::{
        CheckoutSummary, GatewayOrder, Order, OrderItem, OrderStatus, PaymentConfirmation,
        PaymentMethod, PlaceOrder, ShippingPolicy, StatusDisplay,
    };

    // Domain types: product
    pub use crate::domain::product::{
        Drop, FeedState, Product, ProductFeed, ProductPage, ProductQuery, ProductSort,
    };

    // Errors
    pub use crate::error::{AuthError, HttpError, SdkError};
    pub use crate::validation::FieldErrors;

    // Network
    pub use crate::network::DEFAULT_API_URL;

    // Session + notices
    pub use crate::notice::Notice;
    pub use crate::session::Session;

    // Preferences
    pub use crate::prefs::{FileStorage, MemoryStorage, PreferenceChange, Preferences, Storage};

    // Sync
    pub use crate::sync::{Snapshot, SyncConfig};

    // Client + sub-clients
    pub use crate::api::StorefrontApi;
    pub use crate::client::{
        AddressesClient, CartClient, OrdersClient, ProductsClient, StorefrontClient,
        StorefrontClientBuilder, WishlistClient,
    };
    #[cfg(feature = "http")]
    pub use crate::client::HttpStorefrontClient;
    #[cfg(feature = "http")]
    pub use crate::http::{RetryConfig, RetryPolicy, StorefrontHttp};
}
