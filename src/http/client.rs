//! Low-level HTTP client: `StorefrontHttp`.
//!
//! One method per API endpoint, exposed through the `StorefrontApi` trait.
//! Responses are unwrapped from their envelope and converted to domain types
//! here; the stores never see wire types.

use crate::api::StorefrontApi;
use crate::domain::address::wire::{AddressRequest, AddressResponse};
use crate::domain::address::Address;
use crate::domain::cart::wire::{
    AddToCartRequest, CartResponse, RemoveFromCartRequest, UpdateQuantityRequest,
};
use crate::domain::cart::CartLine;
use crate::domain::order::wire::{
    CreateOrderRequest, GatewayOrderResponse, OrderEnvelope, OrdersResponse, VerifyPaymentRequest,
};
use crate::domain::order::{GatewayOrder, Order};
use crate::domain::product::wire::{
    CurrentDropResponse, DropsResponse, ProductEnvelope, ProductsResponse,
};
use crate::domain::product::{Drop, Product, ProductPage, ProductQuery};
use crate::domain::wishlist::wire::{AddToWishlistRequest, WishlistResponse};
use crate::domain::wishlist::WishlistEntry;
use crate::error::{HttpError, SdkError};
use crate::http::envelope::{self, Envelope};
use crate::http::retry::{RetryConfig, RetryPolicy};
use crate::shared::ProductId;

use async_lock::RwLock;
use reqwest::{Client, Method};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Method, body, retry policy and abort signal for one call.
pub struct RequestOptions<'a, B = ()> {
    pub method: Method,
    pub body: Option<&'a B>,
    pub retry: RetryPolicy,
    pub abort: Option<CancellationToken>,
}

impl RequestOptions<'static, ()> {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: None,
            retry: RetryPolicy::Idempotent,
            abort: None,
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            body: None,
            retry: RetryPolicy::None,
            abort: None,
        }
    }
}

impl<'a, B: Serialize> RequestOptions<'a, B> {
    pub fn with_body(method: Method, body: &'a B) -> Self {
        Self {
            method,
            body: Some(body),
            retry: RetryPolicy::None,
            abort: None,
        }
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn abort(mut self, token: CancellationToken) -> Self {
        self.abort = Some(token);
        self
    }
}

/// Low-level HTTP client for the storefront REST API.
#[derive(Clone)]
pub struct StorefrontHttp {
    base_url: String,
    client: Client,
    /// Bearer token of the signed-in user. Never exposed publicly.
    auth_token: Arc<RwLock<Option<String>>>,
}

impl StorefrontHttp {
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(HttpError::from)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            auth_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn has_auth_token(&self) -> bool {
        self.auth_token.read().await.is_some()
    }

    // ── Generic call ─────────────────────────────────────────────────────

    /// Call `path` and return the envelope's `data`.
    pub async fn send<T, B>(&self, path: &str, options: RequestOptions<'_, B>) -> Result<T, SdkError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let envelope: Envelope<T> = self.call(path, options).await?;
        envelope.into_data()
    }

    /// Call `path` and only check that the backend accepted it.
    pub async fn send_ack<B: Serialize>(
        &self,
        path: &str,
        options: RequestOptions<'_, B>,
    ) -> Result<(), SdkError> {
        let envelope: Envelope<IgnoredAny> = self.call(path, options).await?;
        envelope.into_ack()
    }

    async fn call<T, B>(&self, path: &str, options: RequestOptions<'_, B>) -> Result<Envelope<T>, SdkError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = format!("{}{}", self.base_url, path);
        let RequestOptions {
            method,
            body,
            retry,
            abort,
        } = options;
        let request = self.request_with_retry::<Envelope<T>, B>(method, &url, body, retry);

        let result = match abort {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(url = %url, "Request aborted");
                    Err(HttpError::Aborted)
                }
                r = request => r,
            },
            None => request.await,
        };
        Ok(result?)
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn request_with_retry<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let config = match &retry {
            RetryPolicy::None => return self.do_request(&method, url, body).await,
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T, B>(&method, url, body).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let should_retry = match &e {
                        HttpError::ServerError { status, .. } => config.retries_status(*status),
                        HttpError::RateLimited { retry_after_ms } => {
                            if let Some(ms) = retry_after_ms {
                                tokio::time::sleep(Duration::from_millis(*ms)).await;
                            }
                            config.retries_status(429)
                        }
                        HttpError::Connectivity(_) | HttpError::Timeout => true,
                        HttpError::Reqwest(re) => re.is_request(),
                        _ => false,
                    };

                    if should_retry && attempt < config.max_retries {
                        let delay = config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request to {}",
                            url
                        );
                        tokio::time::sleep(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, HttpError> {
        let mut req = self.client.request(method.clone(), url);

        if let Some(token) = self.auth_token.read().await.as_ref() {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|e| self.classify(e))?;
        let status = resp.status();

        if status.is_success() {
            return resp.json::<T>().await.map_err(|e| self.classify(e));
        }

        let status_code = status.as_u16();
        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body_text = resp.text().await.unwrap_or_default();
        let body_text = envelope::error_message(&body_text).unwrap_or(body_text);

        tracing::debug!(status = status_code, url = %url, "Request failed");

        match status_code {
            401 => Err(HttpError::Unauthorized),
            404 => Err(HttpError::NotFound(body_text)),
            429 => Err(HttpError::RateLimited { retry_after_ms }),
            400..=499 => Err(HttpError::BadRequest {
                status: status_code,
                body: body_text,
            }),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }

    fn classify(&self, e: reqwest::Error) -> HttpError {
        if e.is_connect() {
            tracing::warn!(
                base_url = %self.base_url,
                error = %e,
                "Could not reach the storefront API; check STOREFRONT_API_URL"
            );
            HttpError::Connectivity(e.to_string())
        } else if e.is_timeout() {
            HttpError::Timeout
        } else {
            HttpError::Reqwest(e)
        }
    }
}

/// `data` of endpoints that answer with a single address.
#[derive(Deserialize)]
struct AddressEnvelope {
    address: AddressResponse,
}

/// `data` of `GET /api/addresses`.
#[derive(Deserialize)]
struct AddressesResponse {
    #[serde(default)]
    addresses: Vec<AddressResponse>,
}

/// `data` of `GET /api/products/search`.
#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<crate::domain::product::wire::ProductResponse>,
}

impl StorefrontApi for StorefrontHttp {
    async fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.write().await = token;
    }

    // ── Cart ─────────────────────────────────────────────────────────────

    async fn fetch_cart(&self) -> Result<Vec<CartLine>, SdkError> {
        let resp: CartResponse = self.send("/api/cart", RequestOptions::get()).await?;
        Ok(resp.into())
    }

    async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<Vec<CartLine>, SdkError> {
        let resp: CartResponse = self
            .send("/api/cart/add", RequestOptions::with_body(Method::POST, request))
            .await?;
        Ok(resp.into())
    }

    async fn remove_from_cart(
        &self,
        request: &RemoveFromCartRequest,
    ) -> Result<Vec<CartLine>, SdkError> {
        let resp: CartResponse = self
            .send("/api/cart/remove", RequestOptions::with_body(Method::POST, request))
            .await?;
        Ok(resp.into())
    }

    async fn update_cart_quantity(
        &self,
        request: &UpdateQuantityRequest,
    ) -> Result<Vec<CartLine>, SdkError> {
        let resp: CartResponse = self
            .send("/api/cart/update", RequestOptions::with_body(Method::PUT, request))
            .await?;
        Ok(resp.into())
    }

    async fn clear_cart(&self) -> Result<(), SdkError> {
        self.send_ack("/api/cart/clear", RequestOptions::delete()).await
    }

    // ── Wishlist ─────────────────────────────────────────────────────────

    async fn fetch_wishlist(&self) -> Result<Vec<WishlistEntry>, SdkError> {
        let resp: WishlistResponse = self.send("/api/wishlist", RequestOptions::get()).await?;
        Ok(resp.into())
    }

    async fn add_to_wishlist(
        &self,
        request: &AddToWishlistRequest,
    ) -> Result<Vec<WishlistEntry>, SdkError> {
        let resp: WishlistResponse = self
            .send("/api/wishlist/add", RequestOptions::with_body(Method::POST, request))
            .await?;
        Ok(resp.into())
    }

    async fn remove_from_wishlist(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<WishlistEntry>, SdkError> {
        let path = format!(
            "/api/wishlist/remove/{}",
            urlencoding::encode(product_id.as_str())
        );
        let resp: WishlistResponse = self.send(&path, RequestOptions::delete()).await?;
        Ok(resp.into())
    }

    async fn clear_wishlist(&self) -> Result<(), SdkError> {
        self.send_ack("/api/wishlist/clear", RequestOptions::delete())
            .await
    }

    // ── Addresses ────────────────────────────────────────────────────────

    async fn fetch_addresses(&self) -> Result<Vec<Address>, SdkError> {
        let resp: AddressesResponse = self.send("/api/addresses", RequestOptions::get()).await?;
        Ok(resp.addresses.into_iter().map(Address::from).collect())
    }

    async fn create_address(&self, request: &AddressRequest) -> Result<Address, SdkError> {
        let resp: AddressEnvelope = self
            .send("/api/addresses", RequestOptions::with_body(Method::POST, request))
            .await?;
        Ok(resp.address.into())
    }

    async fn update_address(
        &self,
        id: &str,
        request: &AddressRequest,
    ) -> Result<Address, SdkError> {
        let path = format!("/api/addresses/{}", urlencoding::encode(id));
        let resp: AddressEnvelope = self
            .send(&path, RequestOptions::with_body(Method::PUT, request))
            .await?;
        Ok(resp.address.into())
    }

    async fn delete_address(&self, id: &str) -> Result<(), SdkError> {
        let path = format!("/api/addresses/{}", urlencoding::encode(id));
        self.send_ack(&path, RequestOptions::delete()).await
    }

    async fn set_default_address(&self, id: &str) -> Result<(), SdkError> {
        let path = format!("/api/addresses/{}/default", urlencoding::encode(id));
        self.send_ack(&path, RequestOptions::with_body(Method::PATCH, &serde_json::json!({})))
            .await
    }

    // ── Orders ───────────────────────────────────────────────────────────

    async fn fetch_orders(&self) -> Result<Vec<Order>, SdkError> {
        let resp: OrdersResponse = self.send("/api/orders", RequestOptions::get()).await?;
        Ok(resp.into())
    }

    async fn fetch_order(&self, id: &str) -> Result<Order, SdkError> {
        let path = format!("/api/orders/{}", urlencoding::encode(id));
        let resp: OrderEnvelope = self.send(&path, RequestOptions::get()).await?;
        Ok(resp.order.into())
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, SdkError> {
        let resp: OrderEnvelope = self
            .send("/api/orders", RequestOptions::with_body(Method::POST, request))
            .await?;
        Ok(resp.order.into())
    }

    async fn create_payment_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<GatewayOrder, SdkError> {
        let resp: GatewayOrderResponse = self
            .send(
                "/api/payments/create-order",
                RequestOptions::with_body(Method::POST, request),
            )
            .await?;
        Ok(resp.into())
    }

    async fn verify_payment(&self, request: &VerifyPaymentRequest) -> Result<Order, SdkError> {
        let resp: OrderEnvelope = self
            .send(
                "/api/payments/verify",
                RequestOptions::with_body(Method::POST, request),
            )
            .await?;
        Ok(resp.order.into())
    }

    // ── Catalog ──────────────────────────────────────────────────────────

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, SdkError> {
        let qs = query.to_query_string();
        let path = if qs.is_empty() {
            "/api/products".to_string()
        } else {
            format!("/api/products?{}", qs)
        };
        let resp: ProductsResponse = self.send(&path, RequestOptions::get()).await?;
        Ok(resp.into())
    }

    async fn fetch_product(&self, id: &ProductId) -> Result<Product, SdkError> {
        let path = format!("/api/products/{}", urlencoding::encode(id.as_str()));
        let resp: ProductEnvelope = self.send(&path, RequestOptions::get()).await?;
        Ok(resp.product.into())
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>, SdkError> {
        let path = format!("/api/products/search?q={}", urlencoding::encode(term.trim()));
        let resp: SearchResponse = self.send(&path, RequestOptions::get()).await?;
        Ok(resp.products.into_iter().map(Product::from).collect())
    }

    async fn current_drop(&self) -> Result<Option<Drop>, SdkError> {
        let resp: CurrentDropResponse = self
            .send("/api/drops/current", RequestOptions::get())
            .await?;
        Ok(resp.drop.map(Drop::from))
    }

    async fn archived_drops(&self) -> Result<Vec<Drop>, SdkError> {
        let resp: DropsResponse = self
            .send("/api/drops/archived", RequestOptions::get())
            .await?;
        Ok(resp.drops.into_iter().map(Drop::from).collect())
    }
}

impl std::fmt::Debug for StorefrontHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontHttp")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_trailing_slash() {
        let http = StorefrontHttp::new("https://api.example.com/").unwrap();
        assert_eq!(http.base_url(), "https://api.example.com");
    }

    #[tokio::test]
    async fn test_token_is_settable() {
        let http = StorefrontHttp::new("https://api.example.com").unwrap();
        assert!(!http.has_auth_token().await);
        http.set_auth_token(Some("t".into())).await;
        assert!(http.has_auth_token().await);
        http.set_auth_token(None).await;
        assert!(!http.has_auth_token().await);
    }

    #[tokio::test]
    async fn test_connection_refused_is_connectivity() {
        // Port 9 on loopback: nothing listens there.
        let http = StorefrontHttp::new("http://127.0.0.1:9").unwrap();
        let err = http
            .send_ack("/api/cart/clear", RequestOptions::delete())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Http(HttpError::Connectivity(_))), "{:?}", err);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_abort_wins_over_request() {
        let http = StorefrontHttp::new("http://127.0.0.1:9").unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let err = http
            .send::<serde_json::Value, _>("/api/products", RequestOptions::get().abort(token))
            .await
            .unwrap_err();
        assert!(err.is_aborted());
    }
}
