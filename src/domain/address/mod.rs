//! Address domain: saved shipping addresses and the address form.

pub mod client;
mod convert;
pub mod state;
pub mod wire;

use crate::validation::{self, FieldErrors};
use serde::{Deserialize, Serialize};

pub use client::Addresses;

/// A saved address. At most one per user has `is_default` set; the backend
/// enforces that and the client trusts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub is_default: bool,
}

impl Address {
    /// Single-line rendering for order summaries.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.street.as_str()];
        if let Some(apt) = self.apartment.as_deref().filter(|a| !a.is_empty()) {
            parts.push(apt);
        }
        parts.extend([self.city.as_str(), self.state.as_str()]);
        format!("{} - {}", parts.join(", "), self.pincode)
    }
}

/// The address form as the user filled it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub is_default: bool,
}

impl AddressDraft {
    /// Field-level checks. Nothing is sent to the backend unless this passes.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        errors.require("name", "Name", &self.name);
        if errors.require("email", "Email", &self.email) && !validation::is_valid_email(&self.email)
        {
            errors.add("email", "Enter a valid email address");
        }
        if errors.require("phone", "Phone", &self.phone) && !validation::is_valid_phone(&self.phone)
        {
            errors.add("phone", "Enter a valid 10-digit mobile number");
        }
        errors.require("street", "Street address", &self.street);
        errors.require("city", "City", &self.city);
        errors.require("state", "State", &self.state);
        if errors.require("pincode", "Pincode", &self.pincode)
            && !validation::is_valid_pincode(&self.pincode)
        {
            errors.add("pincode", "Enter a valid 6-digit pincode");
        }
        errors.require("country", "Country", &self.country);

        errors.into_result()
    }
}

impl From<&Address> for AddressDraft {
    fn from(a: &Address) -> Self {
        AddressDraft {
            name: a.name.clone(),
            email: a.email.clone(),
            phone: a.phone.clone(),
            street: a.street.clone(),
            apartment: a.apartment.clone(),
            city: a.city.clone(),
            state: a.state.clone(),
            pincode: a.pincode.clone(),
            country: a.country.clone(),
            is_default: a.is_default,
        }
    }
}
