//! `StorefrontApi`: the remote surface the stores are driven by.
//!
//! `StorefrontHttp` implements it against the REST backend. Anything else
//! that implements it (an in-memory backend in tests, a recording proxy)
//! can be handed to `StorefrontClient::with_api`.
//!
//! Requests are wire types; responses are already converted to domain types.

use std::future::Future;

use crate::domain::address::wire::AddressRequest;
use crate::domain::address::Address;
use crate::domain::cart::wire::{AddToCartRequest, RemoveFromCartRequest, UpdateQuantityRequest};
use crate::domain::cart::CartLine;
use crate::domain::order::wire::{CreateOrderRequest, VerifyPaymentRequest};
use crate::domain::order::{GatewayOrder, Order};
use crate::domain::product::{Drop, Product, ProductPage, ProductQuery};
use crate::domain::wishlist::wire::AddToWishlistRequest;
use crate::domain::wishlist::WishlistEntry;
use crate::error::SdkError;
use crate::shared::ProductId;

pub trait StorefrontApi: Send + Sync + 'static {
    /// Bearer token attached to identity-scoped requests. `None` signs out.
    fn set_auth_token(&self, token: Option<String>) -> impl Future<Output = ()> + Send;

    // ── Cart ─────────────────────────────────────────────────────────────

    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartLine>, SdkError>> + Send;

    fn add_to_cart(
        &self,
        request: &AddToCartRequest,
    ) -> impl Future<Output = Result<Vec<CartLine>, SdkError>> + Send;

    fn remove_from_cart(
        &self,
        request: &RemoveFromCartRequest,
    ) -> impl Future<Output = Result<Vec<CartLine>, SdkError>> + Send;

    fn update_cart_quantity(
        &self,
        request: &UpdateQuantityRequest,
    ) -> impl Future<Output = Result<Vec<CartLine>, SdkError>> + Send;

    fn clear_cart(&self) -> impl Future<Output = Result<(), SdkError>> + Send;

    // ── Wishlist ─────────────────────────────────────────────────────────

    fn fetch_wishlist(&self) -> impl Future<Output = Result<Vec<WishlistEntry>, SdkError>> + Send;

    fn add_to_wishlist(
        &self,
        request: &AddToWishlistRequest,
    ) -> impl Future<Output = Result<Vec<WishlistEntry>, SdkError>> + Send;

    fn remove_from_wishlist(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<Vec<WishlistEntry>, SdkError>> + Send;

    fn clear_wishlist(&self) -> impl Future<Output = Result<(), SdkError>> + Send;

    // ── Addresses ────────────────────────────────────────────────────────

    fn fetch_addresses(&self) -> impl Future<Output = Result<Vec<Address>, SdkError>> + Send;

    fn create_address(
        &self,
        request: &AddressRequest,
    ) -> impl Future<Output = Result<Address, SdkError>> + Send;

    fn update_address(
        &self,
        id: &str,
        request: &AddressRequest,
    ) -> impl Future<Output = Result<Address, SdkError>> + Send;

    fn delete_address(&self, id: &str) -> impl Future<Output = Result<(), SdkError>> + Send;

    fn set_default_address(&self, id: &str) -> impl Future<Output = Result<(), SdkError>> + Send;

    // ── Orders ───────────────────────────────────────────────────────────

    fn fetch_orders(&self) -> impl Future<Output = Result<Vec<Order>, SdkError>> + Send;

    fn fetch_order(&self, id: &str) -> impl Future<Output = Result<Order, SdkError>> + Send;

    fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> impl Future<Output = Result<Order, SdkError>> + Send;

    fn create_payment_order(
        &self,
        request: &CreateOrderRequest,
    ) -> impl Future<Output = Result<GatewayOrder, SdkError>> + Send;

    fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> impl Future<Output = Result<Order, SdkError>> + Send;

    // ── Catalog ──────────────────────────────────────────────────────────

    fn list_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<ProductPage, SdkError>> + Send;

    fn fetch_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, SdkError>> + Send;

    fn search_products(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<Vec<Product>, SdkError>> + Send;

    fn current_drop(&self) -> impl Future<Output = Result<Option<Drop>, SdkError>> + Send;

    fn archived_drops(&self) -> impl Future<Output = Result<Vec<Drop>, SdkError>> + Send;
}
