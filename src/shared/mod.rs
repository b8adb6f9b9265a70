//! Identifiers and money shared by every domain.
//!
//! The id newtypes serialize as bare strings, exactly as the backend sends
//! them, so wire structs can hold them directly.

pub mod fmt;
pub mod money;

pub use money::Money;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── ProductId ───────────────────────────────────────────────────────────────

/// Newtype for catalog product identifiers (backend object ids).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for ProductId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ProductId(s.to_string()))
    }
}

impl Serialize for ProductId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ProductId(s))
    }
}

// ─── LineId ──────────────────────────────────────────────────────────────────

const TEMP_PREFIX: &str = "tmp_";

/// Identity of a cart line or wishlist entry.
///
/// Records created optimistically carry a client-generated temporary id
/// (`tmp_<millis>_<random>`) until the server response replaces them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineId(String);

impl LineId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Generate a fresh temporary id for an optimistic record.
    pub fn temporary() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let nonce: u32 = rand::random();
        Self(format!("{}{}_{:08x}", TEMP_PREFIX, millis, nonce))
    }

    /// Whether this id was generated client-side and is not yet confirmed.
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LineId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LineId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for LineId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LineId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(LineId(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_ids_are_flagged_and_unique() {
        let a = LineId::temporary();
        let b = LineId::temporary();
        assert!(a.is_temporary());
        assert_ne!(a, b);
        assert!(!LineId::from("65f1c0a2e4b0").is_temporary());
    }

    #[test]
    fn test_product_id_serializes_as_plain_string() {
        let id = ProductId::from("p_123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p_123\"");
        let back: ProductId = serde_json::from_str("\"p_123\"").unwrap();
        assert_eq!(back, id);
    }
}
