//! `Money`: rupee amounts backed by `Decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};

/// An amount in Indian rupees.
///
/// The backend sends prices as JSON numbers (occasionally as strings);
/// both deserialize. Serializes as a JSON number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole-rupee amount.
    pub fn rupees(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount in paise, the unit the payment gateway expects.
    pub fn to_paise(&self) -> Option<u64> {
        (self.0 * Decimal::ONE_HUNDRED).round().to_u64()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{}", super::fmt::format_inr(self.0))
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.to_f64() {
            Some(f) if self.0.fract().is_zero() => serializer.serialize_i64(f as i64),
            Some(f) => serializer.serialize_f64(f),
            None => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Decimal's own impl accepts numbers and numeric strings.
        <Decimal as Deserialize>::deserialize(deserializer).map(Money)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_numbers_and_strings() {
        let a: Money = serde_json::from_str("2000").unwrap();
        let b: Money = serde_json::from_str("\"2000\"").unwrap();
        let c: Money = serde_json::from_str("1999.5").unwrap();
        assert_eq!(a, Money::rupees(2000));
        assert_eq!(a, b);
        assert_eq!(c.amount(), Decimal::new(19995, 1));
    }

    #[test]
    fn test_serializes_whole_amounts_as_integers() {
        assert_eq!(serde_json::to_string(&Money::rupees(2000)).unwrap(), "2000");
        assert_eq!(
            serde_json::to_string(&Money::new(Decimal::new(4995, 1))).unwrap(),
            "499.5"
        );
    }

    #[test]
    fn test_arithmetic() {
        let line = Money::rupees(2000) * 3;
        assert_eq!(line, Money::rupees(6000));
        let total: Money = vec![Money::rupees(100), Money::rupees(250)].into_iter().sum();
        assert_eq!(total, Money::rupees(350));
        assert_eq!(Money::rupees(6000).to_paise(), Some(600_000));
    }

    #[test]
    fn test_display_uses_rupee_sign() {
        assert_eq!(Money::rupees(6000).to_string(), "₹6,000");
    }
}
