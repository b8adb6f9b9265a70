//! Product domain: catalog products, drops, listing queries.

pub mod client;
mod convert;
pub mod feed;
pub mod query;
pub mod wire;

use crate::domain::cart::ProductSnapshot;
use crate::shared::{Money, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use client::Products;
pub use feed::{FeedState, ProductFeed};
pub use query::{ProductQuery, ProductSort};

// ─── Product ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Money,
    /// Original price when the product is marked down.
    pub compare_at_price: Option<Money>,
    pub images: Vec<String>,
    pub category: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub in_stock: bool,
    /// Drop this product was released in, if any.
    pub drop_id: Option<String>,
}

impl Product {
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price
            .map(|was| was > self.price)
            .unwrap_or(false)
    }

    /// Whole-percent markdown, rounded down. `None` when not on sale.
    pub fn discount_percent(&self) -> Option<u32> {
        let was = self.compare_at_price.filter(|_| self.is_on_sale())?;
        let off = (was.amount() - self.price.amount()) * Decimal::from(100) / was.amount();
        off.floor().to_u32()
    }

    /// Whether the product comes in this size/color combination.
    pub fn offers(&self, size: &str, color: &str) -> bool {
        let size_ok = self.sizes.is_empty() || self.sizes.iter().any(|s| s == size);
        let color_ok = self.colors.is_empty() || self.colors.iter().any(|c| c == color);
        size_ok && color_ok
    }

    /// Display fields carried into cart lines and wishlist entries.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.primary_image().map(str::to_string),
            category: self.category.clone(),
        }
    }
}

// ─── Drop ────────────────────────────────────────────────────────────────────

/// A limited release of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drop {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub products: Vec<Product>,
}

impl Drop {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && !self.has_ended(now)
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.map(|end| end <= now).unwrap_or(false)
    }
}

// ─── ProductPage ─────────────────────────────────────────────────────────────

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u32,
    /// 1-based.
    pub page: u32,
    pub pages: u32,
}

impl ProductPage {
    pub fn has_more(&self) -> bool {
        self.page < self.pages
    }
}
