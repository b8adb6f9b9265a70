//! Wishlist domain: saved products.

pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::domain::cart::ProductSnapshot;
use crate::shared::{LineId, Money, ProductId};
use crate::sync::Keyed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use client::Wishlist;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: LineId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub image: Option<String>,
    pub category: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WishlistEntry {
    pub fn provisional(product: &ProductSnapshot) -> Self {
        Self {
            id: LineId::temporary(),
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            added_at: Utc::now(),
        }
    }
}

impl Keyed for WishlistEntry {
    type Key = ProductId;

    fn key(&self) -> ProductId {
        self.product_id.clone()
    }

    fn is_provisional(&self) -> bool {
        self.id.is_temporary()
    }
}

/// One operation key per product: adds and removes of the same product
/// replace each other, and the call that finally fires sends the net change.
pub(crate) fn sync_key(product_id: &ProductId) -> String {
    format!("wishlist_{}", product_id)
}
