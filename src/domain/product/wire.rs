//! Wire types for the catalog endpoints.

use crate::shared::{Money, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default, alias = "originalPrice")]
    pub compare_at_price: Option<Money>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default, rename = "drop")]
    pub drop_id: Option<String>,
}

fn default_in_stock() -> bool {
    true
}

/// `data` of `GET /api/products`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<ProductResponse>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// `data` of `GET /api/products/{id}`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProductEnvelope {
    pub product: ProductResponse,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DropResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub products: Vec<ProductResponse>,
}

/// `data` of `GET /api/drops/current`; `drop` is absent between drops.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct CurrentDropResponse {
    #[serde(default)]
    pub drop: Option<DropResponse>,
}

/// `data` of `GET /api/drops/archived`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct DropsResponse {
    #[serde(default)]
    pub drops: Vec<DropResponse>,
}
