//! Order domain: placed orders, status progression, checkout.

pub mod checkout;
pub mod client;
mod convert;
pub mod status;
pub mod wire;

use crate::domain::address::{Address, AddressDraft};
use crate::domain::cart::CartLine;
use crate::shared::{Money, ProductId};
use crate::validation::FieldErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use checkout::{CheckoutSummary, ShippingPolicy};
pub use client::Orders;
pub use status::StatusDisplay;

// ─── OrderStatus ─────────────────────────────────────────────────────────────

/// placed → confirmed → shipped → delivered, or cancelled.
///
/// Statuses this client does not know are kept verbatim in `Unknown` rather
/// than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Placed,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    Unknown(String),
}

impl OrderStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "placed" => OrderStatus::Placed,
            "confirmed" => OrderStatus::Confirmed,
            "shipped" => OrderStatus::Shipped,
            "delivered" => OrderStatus::Delivered,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown(s) => s,
        }
    }

    /// Whether the order can still change status.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            OrderStatus::Placed | OrderStatus::Confirmed | OrderStatus::Shipped
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display().label)
    }
}

impl Serialize for OrderStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(OrderStatus::parse(&s))
    }
}

// ─── PaymentMethod ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery: placed directly, no gateway.
    Cod,
    /// Paid through the hosted payment gateway.
    Online,
}

// ─── Order ───────────────────────────────────────────────────────────────────

/// A line of an order, frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: Money,
    pub size: String,
    pub color: String,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    /// Address as it was when the order was placed.
    pub address: Address,
    pub items: Vec<OrderItem>,
    pub totals: OrderTotals,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    /// Gateway payment id for online orders.
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn display_status(&self) -> StatusDisplay {
        self.status.display()
    }
}

// ─── PlaceOrder ──────────────────────────────────────────────────────────────

/// An order about to be placed: where to ship, what, and how it is paid.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrder {
    pub address: Address,
    pub items: Vec<OrderItem>,
    pub payment_method: PaymentMethod,
}

impl PlaceOrder {
    pub fn from_cart(address: Address, lines: &[CartLine], payment_method: PaymentMethod) -> Self {
        let items = lines
            .iter()
            .map(|l| OrderItem {
                product_id: l.product_id.clone(),
                name: l.name.clone(),
                image: l.image.clone(),
                quantity: l.quantity,
                price: l.price,
                size: l.size.clone(),
                color: l.color.clone(),
            })
            .collect();
        Self {
            address,
            items,
            payment_method,
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.items.is_empty() {
            errors.add("items", "Your cart is empty");
        }
        if let Err(address_errors) = AddressDraft::from(&self.address).validate() {
            for (field, message) in address_errors.fields() {
                errors.add(field, message);
            }
        }
        errors.into_result()
    }
}

// ─── Payment gateway ─────────────────────────────────────────────────────────

/// Handle returned when a gateway-backed order is opened. The front end
/// passes these to the gateway's hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub gateway_order_id: String,
    /// Amount in paise.
    pub amount: u64,
    pub currency: String,
    /// Publishable gateway key.
    pub key_id: String,
}

/// What the hosted checkout hands back after a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::LineId;
    use chrono::Utc;

    fn address() -> Address {
        Address {
            id: "a1".into(),
            name: "Asha".into(),
            email: "asha@example.in".into(),
            phone: "9876543210".into(),
            street: "12 MG Road".into(),
            apartment: None,
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            pincode: "560001".into(),
            country: "India".into(),
            is_default: true,
        }
    }

    #[test]
    fn test_place_order_copies_cart_lines() {
        let line = CartLine {
            id: LineId::from("l1"),
            product_id: ProductId::from("p1"),
            name: "Tee".into(),
            price: Money::rupees(2000),
            image: None,
            category: None,
            size: "M".into(),
            color: "Black".into(),
            quantity: 3,
            added_at: Utc::now(),
        };
        let place = PlaceOrder::from_cart(address(), &[line], PaymentMethod::Cod);
        assert!(place.validate().is_ok());
        assert_eq!(place.items[0].line_total(), Money::rupees(6000));
    }

    #[test]
    fn test_empty_order_is_rejected() {
        let place = PlaceOrder::from_cart(address(), &[], PaymentMethod::Online);
        let errors = place.validate().unwrap_err();
        assert_eq!(errors.get("items"), Some("Your cart is empty"));
    }
}
