//! Wire types for the order and payment endpoints.

use super::{OrderStatus, PaymentMethod};
use crate::domain::address::wire::AddressRequest;
use crate::shared::{Money, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemWire {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
    pub price: Money,
    pub size: String,
    pub color: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub order_number: String,
    pub shipping_address: AddressRequest,
    #[serde(default)]
    pub items: Vec<OrderItemWire>,
    pub subtotal: Money,
    #[serde(default)]
    pub shipping: Money,
    #[serde(default)]
    pub tax: Money,
    pub total: Money,
    pub status: OrderStatus,
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cod
}

/// `data` of `GET /api/orders`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<OrderResponse>,
}

/// `data` of `GET /api/orders/{id}`, `POST /api/orders` and
/// `POST /api/payments/verify`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrderEnvelope {
    pub order: OrderResponse,
}

/// Body of `POST /api/orders` and `POST /api/payments/create-order`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    pub shipping_address: AddressRequest,
    pub items: Vec<OrderItemRequest>,
    pub payment_method: PaymentMethod,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Money,
    pub size: String,
    pub color: String,
}

/// `data` of `POST /api/payments/create-order`.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOrderResponse {
    #[serde(alias = "id")]
    pub order_id: String,
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub key_id: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Body of `POST /api/payments/verify`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}
