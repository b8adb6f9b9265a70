//! Conversions: cart wire types ↔ domain types.

use super::wire::{AddToCartRequest, CartItemResponse, CartResponse, RemoveFromCartRequest, UpdateQuantityRequest};
use super::{CartLine, LineKey};
use crate::shared::LineId;
use chrono::Utc;

impl From<CartItemResponse> for CartLine {
    fn from(item: CartItemResponse) -> Self {
        CartLine {
            id: LineId::from(item.id),
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            image: item.image,
            category: item.category,
            size: item.size,
            color: item.color,
            quantity: item.quantity,
            added_at: item.added_at.unwrap_or_else(Utc::now),
        }
    }
}

impl From<CartResponse> for Vec<CartLine> {
    fn from(resp: CartResponse) -> Self {
        resp.items.into_iter().map(CartLine::from).collect()
    }
}

impl From<&CartLine> for AddToCartRequest {
    fn from(line: &CartLine) -> Self {
        AddToCartRequest {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price: line.price,
            image: line.image.clone(),
            category: line.category.clone(),
            size: line.size.clone(),
            color: line.color.clone(),
            quantity: line.quantity,
        }
    }
}

impl From<&LineKey> for RemoveFromCartRequest {
    fn from(key: &LineKey) -> Self {
        RemoveFromCartRequest {
            product_id: key.product_id.clone(),
            size: key.size.clone(),
            color: key.color.clone(),
        }
    }
}

impl UpdateQuantityRequest {
    pub fn new(key: &LineKey, quantity: u32) -> Self {
        UpdateQuantityRequest {
            product_id: key.product_id.clone(),
            size: key.size.clone(),
            color: key.color.clone(),
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Money;

    #[test]
    fn test_parses_backend_cart() {
        let json = r#"{
            "items": [{
                "_id": "65f1c0a2",
                "productId": "p1",
                "name": "Linen Shirt",
                "price": 2000,
                "image": "https://cdn.example.com/p1.jpg",
                "size": "M",
                "color": "Black",
                "quantity": 2,
                "addedAt": "2026-03-01T10:00:00Z"
            }]
        }"#;
        let resp: CartResponse = serde_json::from_str(json).unwrap();
        let lines: Vec<CartLine> = resp.into();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id.as_str(), "65f1c0a2");
        assert!(!lines[0].id.is_temporary());
        assert_eq!(lines[0].price, Money::rupees(2000));
        assert_eq!(lines[0].category, None);
        assert_eq!(lines[0].line_total(), Money::rupees(4000));
    }

    #[test]
    fn test_missing_items_is_empty_cart() {
        let resp: CartResponse = serde_json::from_str("{}").unwrap();
        let lines: Vec<CartLine> = resp.into();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_request_uses_camel_case() {
        let req = UpdateQuantityRequest::new(&LineKey::new("p1", "M", "Black"), 3);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["productId"], "p1");
        assert_eq!(json["quantity"], 3);
    }
}
