//! Conversions: wishlist wire types ↔ domain types.

use super::wire::{AddToWishlistRequest, WishlistItemResponse, WishlistResponse};
use super::WishlistEntry;
use crate::domain::cart::ProductSnapshot;
use crate::shared::LineId;
use chrono::Utc;

impl From<WishlistItemResponse> for WishlistEntry {
    fn from(item: WishlistItemResponse) -> Self {
        WishlistEntry {
            id: LineId::from(item.id),
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            image: item.image,
            category: item.category,
            added_at: item.added_at.unwrap_or_else(Utc::now),
        }
    }
}

impl From<WishlistResponse> for Vec<WishlistEntry> {
    fn from(resp: WishlistResponse) -> Self {
        resp.items.into_iter().map(WishlistEntry::from).collect()
    }
}

impl From<&ProductSnapshot> for AddToWishlistRequest {
    fn from(product: &ProductSnapshot) -> Self {
        AddToWishlistRequest {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
        }
    }
}
