//! Wishlist update logic.

use super::WishlistEntry;
use crate::domain::cart::ProductSnapshot;
use crate::shared::{LineId, ProductId};

/// Insert a provisional entry unless the product is already saved.
/// Returns the new entry's id, or `None` for a duplicate.
pub fn apply_add(entries: &mut Vec<WishlistEntry>, product: &ProductSnapshot) -> Option<LineId> {
    if contains(entries, &product.product_id) {
        return None;
    }
    let entry = WishlistEntry::provisional(product);
    let id = entry.id.clone();
    entries.push(entry);
    Some(id)
}

/// Remove the entry for a product. `None` if it was not saved.
pub fn apply_remove(entries: &mut Vec<WishlistEntry>, product_id: &ProductId) -> Option<WishlistEntry> {
    let pos = entries.iter().position(|e| &e.product_id == product_id)?;
    Some(entries.remove(pos))
}

pub fn contains(entries: &[WishlistEntry], product_id: &ProductId) -> bool {
    entries.iter().any(|e| &e.product_id == product_id)
}
