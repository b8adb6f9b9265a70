//! Client-side form checks run before any network call.
//!
//! Failures are collected per field so a form can show every message at once.

use regex::Regex;
use std::collections::BTreeMap;

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex");

    /// Indian mobile number, optionally prefixed with `+91` or `0`.
    static ref PHONE_RE: Regex = Regex::new(r"^(?:\+91[\s-]?|0)?[6-9][0-9]{9}$").expect("Invalid regex");

    /// Six digits, first digit non-zero.
    static ref PINCODE_RE: Regex = Regex::new(r"^[1-9][0-9]{5}$").expect("Invalid regex");
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

pub fn is_valid_pincode(pincode: &str) -> bool {
    PINCODE_RE.is_match(pincode.trim())
}

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field. The first message for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// Record "required" if the value is blank. Returns whether it was present.
    pub fn require(&mut self, field: &'static str, label: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, format!("{} is required", label));
            false
        } else {
            true
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `Ok(())` when no field failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .errors
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pincode() {
        assert!(is_valid_pincode("560001"));
        assert!(is_valid_pincode(" 110011 "));
        assert!(!is_valid_pincode("12345"));
        assert!(!is_valid_pincode("0560001"));
        assert!(!is_valid_pincode("056000"));
        assert!(!is_valid_pincode("56000a"));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+91 9876543210"));
        assert!(is_valid_phone("09876543210"));
        assert!(!is_valid_phone("1234567890"));
        assert!(!is_valid_phone("98765"));
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("asha@example.in"));
        assert!(!is_valid_email("asha@example"));
        assert!(!is_valid_email("asha example.in"));
    }

    #[test]
    fn test_field_errors_keep_first_message() {
        let mut errors = FieldErrors::new();
        assert!(!errors.require("city", "City", "  "));
        errors.add("city", "second");
        assert_eq!(errors.get("city"), Some("City is required"));
        assert_eq!(errors.len(), 1);
        assert!(errors.into_result().is_err());
    }
}
