//! Conversions: address wire types ↔ domain types.

use super::wire::{AddressRequest, AddressResponse};
use super::{Address, AddressDraft};

impl From<AddressResponse> for Address {
    fn from(a: AddressResponse) -> Self {
        Address {
            id: a.id,
            name: a.name,
            email: a.email,
            phone: a.phone,
            street: a.street,
            apartment: a.apartment.filter(|s| !s.trim().is_empty()),
            city: a.city,
            state: a.state,
            pincode: a.pincode,
            country: a.country,
            is_default: a.is_default,
        }
    }
}

impl From<&AddressDraft> for AddressRequest {
    fn from(d: &AddressDraft) -> Self {
        AddressRequest {
            name: d.name.trim().to_string(),
            email: d.email.trim().to_string(),
            phone: d.phone.trim().to_string(),
            street: d.street.trim().to_string(),
            apartment: d
                .apartment
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            city: d.city.trim().to_string(),
            state: d.state.trim().to_string(),
            pincode: d.pincode.trim().to_string(),
            country: d.country.trim().to_string(),
            is_default: d.is_default,
        }
    }
}

impl From<&Address> for AddressRequest {
    fn from(a: &Address) -> Self {
        AddressRequest::from(&AddressDraft::from(a))
    }
}

/// Snapshots embedded in orders carry no id of their own.
impl From<AddressRequest> for Address {
    fn from(a: AddressRequest) -> Self {
        Address {
            id: String::new(),
            name: a.name,
            email: a.email,
            phone: a.phone,
            street: a.street,
            apartment: a.apartment.filter(|s| !s.trim().is_empty()),
            city: a.city,
            state: a.state,
            pincode: a.pincode,
            country: a.country,
            is_default: false,
        }
    }
}
