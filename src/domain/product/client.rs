//! Products sub-client: listing, search, drops, TTL cache.

use std::sync::Arc;

use tokio::time::Instant;

use crate::api::StorefrontApi;
use crate::client::StorefrontClient;
use crate::domain::product::{Drop, Product, ProductFeed, ProductPage, ProductQuery};
use crate::error::SdkError;
use crate::shared::ProductId;

/// Sub-client for the catalog. Catalog reads need no session.
pub struct Products<'a, A: StorefrontApi> {
    pub(crate) client: &'a StorefrontClient<A>,
}

impl<'a, A: StorefrontApi> Products<'a, A> {
    /// One page of products. Every product returned is cached.
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, SdkError> {
        let page = self.client.api.list_products(query).await?;
        self.cache_products(&page.products).await;
        Ok(page)
    }

    /// Get a product by id. Uses TTL cache.
    pub async fn get(&self, id: &ProductId) -> Result<Product, SdkError> {
        {
            let cache = self.client.product_cache.read().await;
            if let Some((product, fetched_at)) = cache.get(id) {
                if fetched_at.elapsed() < self.client.product_cache_ttl {
                    return Ok(product.clone());
                }
            }
        }

        let product = self.client.api.fetch_product(id).await?;
        self.cache_products(std::slice::from_ref(&product)).await;
        Ok(product)
    }

    /// Search by free text. A blank term returns nothing without a call.
    pub async fn search(&self, term: &str) -> Result<Vec<Product>, SdkError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.client.api.search_products(term).await
    }

    /// The drop currently on sale, if any.
    pub async fn current_drop(&self) -> Result<Option<Drop>, SdkError> {
        self.client.api.current_drop().await
    }

    pub async fn archived_drops(&self) -> Result<Vec<Drop>, SdkError> {
        self.client.api.archived_drops().await
    }

    /// A listing container for one view. Each view should own its feed.
    pub fn feed(&self) -> ProductFeed<A> {
        ProductFeed::new(Arc::clone(&self.client.api))
    }

    /// Invalidate a cached product.
    pub async fn invalidate(&self, id: &ProductId) {
        self.client.product_cache.write().await.remove(id);
    }

    /// Clear all product caches.
    pub async fn clear_cache(&self) {
        self.client.product_cache.write().await.clear();
    }

    /// Number of cached products, expired ones included until the next
    /// insert evicts them.
    pub async fn cache_len(&self) -> usize {
        self.client.product_cache.read().await.len()
    }

    async fn cache_products(&self, products: &[Product]) {
        if products.is_empty() {
            return;
        }
        let now = Instant::now();
        let ttl = self.client.product_cache_ttl;
        let mut cache = self.client.product_cache.write().await;
        cache.retain(|_, (_, fetched_at)| now.duration_since(*fetched_at) < ttl);
        for product in products {
            cache.insert(product.id.clone(), (product.clone(), now));
        }
    }
}
