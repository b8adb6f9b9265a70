//! Wire types for the cart endpoints.

use crate::shared::{Money, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line as the backend returns it.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

/// `data` of every cart endpoint that returns the cart.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct CartResponse {
    #[serde(default)]
    pub items: Vec<CartItemResponse>,
}

/// `POST /api/cart/add`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub size: String,
    pub color: String,
    pub quantity: u32,
}

/// `POST /api/cart/remove`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
}

/// `PUT /api/cart/update`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub quantity: u32,
}
