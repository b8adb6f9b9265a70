//! In-memory storefront backend for driving `StorefrontClient` in tests.
//!
//! Behaves like the REST backend closely enough for the stores: cart lines
//! are merged by product/size/color, addresses get server ids, and so on.
//! Every call is recorded; individual endpoints can be made to fail.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use storefront_sdk::api::StorefrontApi;
use storefront_sdk::domain::address::wire::AddressRequest;
use storefront_sdk::domain::cart::wire::{
    AddToCartRequest, RemoveFromCartRequest, UpdateQuantityRequest,
};
use storefront_sdk::domain::order::wire::{CreateOrderRequest, VerifyPaymentRequest};
use storefront_sdk::domain::wishlist::wire::AddToWishlistRequest;
use storefront_sdk::prelude::*;

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchCart,
    AddToCart(AddToCartRequest),
    RemoveFromCart(RemoveFromCartRequest),
    UpdateQuantity(UpdateQuantityRequest),
    ClearCart,
    FetchWishlist,
    AddToWishlist(ProductId),
    RemoveFromWishlist(ProductId),
    ClearWishlist,
    FetchAddresses,
    CreateAddress(AddressRequest),
    UpdateAddress(String),
    DeleteAddress(String),
    SetDefaultAddress(String),
    FetchOrders,
    FetchOrder(String),
    CreateOrder(CreateOrderRequest),
    CreatePaymentOrder,
    VerifyPayment(String),
    ListProducts(ProductQuery),
    FetchProduct(ProductId),
    SearchProducts(String),
    CurrentDrop,
    ArchivedDrops,
}

impl Call {
    /// Anything that changes server state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Call::FetchCart
                | Call::FetchWishlist
                | Call::FetchAddresses
                | Call::FetchOrders
                | Call::FetchOrder(_)
                | Call::ListProducts(_)
                | Call::FetchProduct(_)
                | Call::SearchProducts(_)
                | Call::CurrentDrop
                | Call::ArchivedDrops
        )
    }
}

#[derive(Default)]
struct State {
    cart: Vec<CartLine>,
    wishlist: Vec<WishlistEntry>,
    addresses: Vec<Address>,
    orders: Vec<Order>,
    products: Vec<Product>,
    next_id: u64,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
    delays: HashMap<&'static str, VecDeque<Duration>>,
    token: Option<String>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", prefix, self.next_id)
    }
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let backend = Self::default();
        backend.lock().products = products;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make `endpoint` (the `StorefrontApi` method name) answer 500.
    pub fn fail(&self, endpoint: &'static str) {
        self.lock().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.lock().failing.remove(endpoint);
    }

    /// Hold the next call to `endpoint` for `delay` after it is recorded,
    /// before it takes effect.
    pub fn delay_next(&self, endpoint: &'static str, delay: Duration) {
        self.lock()
            .delays
            .entry(endpoint)
            .or_default()
            .push_back(delay);
    }

    async fn pause(&self, endpoint: &'static str) {
        let delay = self
            .lock()
            .delays
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn server_cart(&self) -> Vec<CartLine> {
        self.lock().cart.clone()
    }

    pub fn server_wishlist(&self) -> Vec<WishlistEntry> {
        self.lock().wishlist.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    /// Record `call`, then fail it if its endpoint is marked failing.
    fn enter(&self, endpoint: &'static str, call: Call) -> Result<MutexGuard<'_, State>, SdkError> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(endpoint) {
            return Err(HttpError::ServerError {
                status: 500,
                body: format!("{} failed", endpoint),
            }
            .into());
        }
        Ok(state)
    }
}

impl StorefrontApi for FakeBackend {
    async fn set_auth_token(&self, token: Option<String>) {
        self.lock().token = token;
    }

    // ── Cart ─────────────────────────────────────────────────────────────

    async fn fetch_cart(&self) -> Result<Vec<CartLine>, SdkError> {
        let state = self.enter("fetch_cart", Call::FetchCart)?;
        Ok(state.cart.clone())
    }

    async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<Vec<CartLine>, SdkError> {
        self.enter("add_to_cart", Call::AddToCart(request.clone()))?;
        self.pause("add_to_cart").await;
        let mut state = self.lock();
        let existing = state.cart.iter().position(|l| {
            l.product_id == request.product_id && l.size == request.size && l.color == request.color
        });
        match existing {
            Some(i) if state.cart[i].quantity + request.quantity > MAX_LINE_QUANTITY => {
                return Err(SdkError::Rejected {
                    message: "Maximum quantity reached".into(),
                })
            }
            Some(i) => state.cart[i].quantity += request.quantity,
            None => {
                let id = state.next_id("line");
                state.cart.push(CartLine {
                    id: LineId::new(id),
                    product_id: request.product_id.clone(),
                    name: request.name.clone(),
                    price: request.price,
                    image: request.image.clone(),
                    category: request.category.clone(),
                    size: request.size.clone(),
                    color: request.color.clone(),
                    quantity: request.quantity,
                    added_at: Utc::now(),
                });
            }
        }
        Ok(state.cart.clone())
    }

    async fn remove_from_cart(
        &self,
        request: &RemoveFromCartRequest,
    ) -> Result<Vec<CartLine>, SdkError> {
        let mut state = self.enter("remove_from_cart", Call::RemoveFromCart(request.clone()))?;
        state.cart.retain(|l| {
            !(l.product_id == request.product_id
                && l.size == request.size
                && l.color == request.color)
        });
        Ok(state.cart.clone())
    }

    async fn update_cart_quantity(
        &self,
        request: &UpdateQuantityRequest,
    ) -> Result<Vec<CartLine>, SdkError> {
        let mut state = self.enter("update_cart_quantity", Call::UpdateQuantity(request.clone()))?;
        if let Some(line) = state.cart.iter_mut().find(|l| {
            l.product_id == request.product_id && l.size == request.size && l.color == request.color
        }) {
            line.quantity = request.quantity;
        }
        Ok(state.cart.clone())
    }

    async fn clear_cart(&self) -> Result<(), SdkError> {
        let mut state = self.enter("clear_cart", Call::ClearCart)?;
        state.cart.clear();
        Ok(())
    }

    // ── Wishlist ─────────────────────────────────────────────────────────

    async fn fetch_wishlist(&self) -> Result<Vec<WishlistEntry>, SdkError> {
        let state = self.enter("fetch_wishlist", Call::FetchWishlist)?;
        Ok(state.wishlist.clone())
    }

    async fn add_to_wishlist(
        &self,
        request: &AddToWishlistRequest,
    ) -> Result<Vec<WishlistEntry>, SdkError> {
        let mut state = self.enter(
            "add_to_wishlist",
            Call::AddToWishlist(request.product_id.clone()),
        )?;
        if !state.wishlist.iter().any(|e| e.product_id == request.product_id) {
            let id = state.next_id("wish");
            state.wishlist.push(WishlistEntry {
                id: LineId::new(id),
                product_id: request.product_id.clone(),
                name: request.name.clone(),
                price: request.price,
                image: request.image.clone(),
                category: request.category.clone(),
                added_at: Utc::now(),
            });
        }
        Ok(state.wishlist.clone())
    }

    async fn remove_from_wishlist(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<WishlistEntry>, SdkError> {
        let mut state = self.enter(
            "remove_from_wishlist",
            Call::RemoveFromWishlist(product_id.clone()),
        )?;
        state.wishlist.retain(|e| &e.product_id != product_id);
        Ok(state.wishlist.clone())
    }

    async fn clear_wishlist(&self) -> Result<(), SdkError> {
        let mut state = self.enter("clear_wishlist", Call::ClearWishlist)?;
        state.wishlist.clear();
        Ok(())
    }

    // ── Addresses ────────────────────────────────────────────────────────

    async fn fetch_addresses(&self) -> Result<Vec<Address>, SdkError> {
        let state = self.enter("fetch_addresses", Call::FetchAddresses)?;
        Ok(state.addresses.clone())
    }

    async fn create_address(&self, request: &AddressRequest) -> Result<Address, SdkError> {
        let mut state = self.enter("create_address", Call::CreateAddress(request.clone()))?;
        let mut address = Address::from(request.clone());
        address.id = state.next_id("addr");
        address.is_default = request.is_default || state.addresses.is_empty();
        if address.is_default {
            state.addresses.iter_mut().for_each(|a| a.is_default = false);
        }
        state.addresses.push(address.clone());
        Ok(address)
    }

    async fn update_address(&self, id: &str, request: &AddressRequest) -> Result<Address, SdkError> {
        let mut state = self.enter("update_address", Call::UpdateAddress(id.to_string()))?;
        let Some(existing) = state.addresses.iter_mut().find(|a| a.id == id) else {
            return Err(HttpError::NotFound(format!("Address {}", id)).into());
        };
        let mut updated = Address::from(request.clone());
        updated.id = existing.id.clone();
        updated.is_default = existing.is_default;
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_address(&self, id: &str) -> Result<(), SdkError> {
        let mut state = self.enter("delete_address", Call::DeleteAddress(id.to_string()))?;
        state.addresses.retain(|a| a.id != id);
        Ok(())
    }

    async fn set_default_address(&self, id: &str) -> Result<(), SdkError> {
        let mut state = self.enter("set_default_address", Call::SetDefaultAddress(id.to_string()))?;
        state
            .addresses
            .iter_mut()
            .for_each(|a| a.is_default = a.id == id);
        Ok(())
    }

    // ── Orders ───────────────────────────────────────────────────────────

    async fn fetch_orders(&self) -> Result<Vec<Order>, SdkError> {
        let state = self.enter("fetch_orders", Call::FetchOrders)?;
        Ok(state.orders.clone())
    }

    async fn fetch_order(&self, id: &str) -> Result<Order, SdkError> {
        let state = self.enter("fetch_order", Call::FetchOrder(id.to_string()))?;
        state
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| HttpError::NotFound(format!("Order {}", id)).into())
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, SdkError> {
        let mut state = self.enter("create_order", Call::CreateOrder(request.clone()))?;
        let order = record_order(&mut state, request, None);
        Ok(order)
    }

    async fn create_payment_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<GatewayOrder, SdkError> {
        let mut state = self.enter("create_payment_order", Call::CreatePaymentOrder)?;
        let amount: Money = request.items.iter().map(|i| i.price * i.quantity).sum();
        Ok(GatewayOrder {
            gateway_order_id: state.next_id("gw"),
            amount: amount.to_paise().unwrap_or(0),
            currency: "INR".into(),
            key_id: "rzp_test_key".into(),
        })
    }

    async fn verify_payment(&self, request: &VerifyPaymentRequest) -> Result<Order, SdkError> {
        let mut state = self.enter(
            "verify_payment",
            Call::VerifyPayment(request.gateway_order_id.clone()),
        )?;
        if request.signature.is_empty() {
            return Err(SdkError::Rejected {
                message: "Payment verification failed".into(),
            });
        }
        // The backend rebuilds the order from the cart it holds.
        let items = state
            .cart
            .iter()
            .map(|l| storefront_sdk::domain::order::wire::OrderItemRequest {
                product_id: l.product_id.clone(),
                name: l.name.clone(),
                quantity: l.quantity,
                price: l.price,
                size: l.size.clone(),
                color: l.color.clone(),
            })
            .collect();
        let address = state
            .addresses
            .first()
            .cloned()
            .unwrap_or_else(|| Address::from(sample_request()));
        let request = CreateOrderRequest {
            address_id: Some(address.id.clone()),
            shipping_address: AddressRequest::from(&address),
            items,
            payment_method: PaymentMethod::Online,
        };
        Ok(record_order(&mut state, &request, Some("pay_1".into())))
    }

    // ── Catalog ──────────────────────────────────────────────────────────

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, SdkError> {
        self.enter("list_products", Call::ListProducts(query.clone()))?;
        self.pause("list_products").await;
        let state = self.lock();
        let products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| match &query.category {
                Some(c) => p.category.as_deref() == Some(c.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        Ok(ProductPage {
            total: products.len() as u32,
            page: 1,
            pages: 1,
            products,
        })
    }

    async fn fetch_product(&self, id: &ProductId) -> Result<Product, SdkError> {
        let state = self.enter("fetch_product", Call::FetchProduct(id.clone()))?;
        state
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| HttpError::NotFound(format!("Product {}", id)).into())
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>, SdkError> {
        let state = self.enter("search_products", Call::SearchProducts(term.to_string()))?;
        let term = term.to_lowercase();
        Ok(state
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&term))
            .cloned()
            .collect())
    }

    async fn current_drop(&self) -> Result<Option<Drop>, SdkError> {
        let _state = self.enter("current_drop", Call::CurrentDrop)?;
        Ok(None)
    }

    async fn archived_drops(&self) -> Result<Vec<Drop>, SdkError> {
        let _state = self.enter("archived_drops", Call::ArchivedDrops)?;
        Ok(Vec::new())
    }
}

fn record_order(state: &mut State, request: &CreateOrderRequest, payment_id: Option<String>) -> Order {
    let items: Vec<OrderItem> = request
        .items
        .iter()
        .map(|i| OrderItem {
            product_id: i.product_id.clone(),
            name: i.name.clone(),
            image: None,
            quantity: i.quantity,
            price: i.price,
            size: i.size.clone(),
            color: i.color.clone(),
        })
        .collect();
    let subtotal: Money = items.iter().map(OrderItem::line_total).sum();
    let shipping = ShippingPolicy::default().shipping_for(subtotal);
    let id = state.next_id("order");
    let order = Order {
        order_number: format!("ORD-{}", id),
        id,
        address: Address::from(request.shipping_address.clone()),
        items,
        totals: storefront_sdk::domain::order::OrderTotals {
            subtotal,
            shipping,
            tax: Money::rupees(0),
            total: subtotal + shipping,
        },
        status: OrderStatus::Placed,
        payment_method: request.payment_method,
        payment_id,
        created_at: Utc::now(),
    };
    state.orders.insert(0, order.clone());
    state.cart.clear();
    order
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn snapshot(id: &str, rupees: i64) -> ProductSnapshot {
    ProductSnapshot {
        product_id: ProductId::from(id),
        name: format!("Product {}", id),
        price: Money::rupees(rupees),
        image: Some(format!("https://cdn.example.com/{}.jpg", id)),
        category: Some("tees".into()),
    }
}

pub fn product(id: &str, rupees: i64, category: &str) -> Product {
    Product {
        id: ProductId::from(id),
        name: format!("Product {}", id),
        slug: id.to_string(),
        description: None,
        price: Money::rupees(rupees),
        compare_at_price: None,
        images: vec![format!("https://cdn.example.com/{}.jpg", id)],
        category: Some(category.to_string()),
        sizes: vec!["S".into(), "M".into(), "L".into()],
        colors: vec!["Black".into()],
        in_stock: true,
        drop_id: None,
    }
}

pub fn draft() -> AddressDraft {
    AddressDraft {
        name: "Asha Rao".into(),
        email: "asha@example.in".into(),
        phone: "9876543210".into(),
        street: "12 MG Road".into(),
        apartment: None,
        city: "Bengaluru".into(),
        state: "Karnataka".into(),
        pincode: "560001".into(),
        country: "India".into(),
        is_default: false,
    }
}

fn sample_request() -> AddressRequest {
    AddressRequest::from(&draft())
}

pub fn session() -> Session {
    Session::new("user_1", "token_1")
}

/// A signed-in client over a fresh fake backend.
pub async fn signed_in() -> StorefrontClient<FakeBackend> {
    signed_in_with(FakeBackend::new()).await
}

pub async fn signed_in_with(backend: FakeBackend) -> StorefrontClient<FakeBackend> {
    let client = StorefrontClient::with_api(backend);
    client.sign_in(session()).await.unwrap();
    client.api().clear_calls();
    client
}
