//! Address selection helpers.

use super::Address;

/// The address flagged default, else the first saved one.
pub fn default_address(addresses: &[Address]) -> Option<&Address> {
    addresses
        .iter()
        .find(|a| a.is_default)
        .or_else(|| addresses.first())
}

pub fn find<'a>(addresses: &'a [Address], id: &str) -> Option<&'a Address> {
    addresses.iter().find(|a| a.id == id)
}
