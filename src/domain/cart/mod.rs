//! Cart domain: lines, identity triple, totals.

pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::shared::{LineId, Money, ProductId};
use crate::sync::Keyed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use client::Cart;
pub use state::CartTotals;

/// Hard cap on the quantity of a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 6;

// ─── LineKey ─────────────────────────────────────────────────────────────────

/// Identity of a cart line for deduplication: the same product in the same
/// size and color is always one line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
}

impl LineKey {
    pub fn new(product_id: impl Into<ProductId>, size: &str, color: &str) -> Self {
        Self {
            product_id: product_id.into(),
            size: size.to_string(),
            color: color.to_string(),
        }
    }

    /// Key of this line in the pending-mutation table, e.g. `cart_p1_M_Black`.
    /// Adds, removes and quantity changes of one line share it, so the latest
    /// one replaces whatever is still waiting.
    pub fn sync_key(&self) -> String {
        format!("cart_{}_{}_{}", self.product_id, self.size, self.color)
    }
}

// ─── ProductSnapshot ─────────────────────────────────────────────────────────

/// Display fields copied from the catalog at the time of adding, so the line
/// can render before the server answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub image: Option<String>,
    pub category: Option<String>,
}

// ─── CartLine ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: LineId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub image: Option<String>,
    pub category: Option<String>,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// A provisional line for an item the server has not confirmed yet.
    pub fn provisional(item: &AddToCart) -> Self {
        Self {
            id: LineId::temporary(),
            product_id: item.product.product_id.clone(),
            name: item.product.name.clone(),
            price: item.product.price,
            image: item.product.image.clone(),
            category: item.product.category.clone(),
            size: item.size.clone(),
            color: item.color.clone(),
            quantity: item.quantity,
            added_at: Utc::now(),
        }
    }

    pub fn line_key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    pub fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.color == key.color
    }

    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }

    /// Whether one more unit would stay within the cap.
    pub fn can_increment(&self) -> bool {
        self.quantity < MAX_LINE_QUANTITY
    }
}

impl Keyed for CartLine {
    type Key = LineKey;

    fn key(&self) -> LineKey {
        self.line_key()
    }

    fn is_provisional(&self) -> bool {
        self.id.is_temporary()
    }
}

// ─── AddToCart ───────────────────────────────────────────────────────────────

/// A user's request to add `quantity` of a product in a size and color.
#[derive(Debug, Clone, PartialEq)]
pub struct AddToCart {
    pub product: ProductSnapshot,
    pub size: String,
    pub color: String,
    pub quantity: u32,
}

impl AddToCart {
    pub fn new(product: ProductSnapshot, size: &str, color: &str, quantity: u32) -> Self {
        Self {
            product,
            size: size.to_string(),
            color: color.to_string(),
            quantity,
        }
    }

    pub fn line_key(&self) -> LineKey {
        LineKey {
            product_id: self.product.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }
}
