//! Checkout summary shown before the backend computes authoritative totals.

use crate::domain::cart::{CartLine, CartTotals};
use crate::shared::Money;

/// Flat-rate shipping, waived above a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Subtotals at or above this ship free.
    pub free_above: Money,
    pub flat_fee: Money,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_above: Money::rupees(1500),
            flat_fee: Money::rupees(99),
        }
    }
}

impl ShippingPolicy {
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal.is_zero() || subtotal >= self.free_above {
            Money::ZERO
        } else {
            self.flat_fee
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    pub item_count: u32,
}

impl CheckoutSummary {
    pub fn from_cart(lines: &[CartLine], policy: &ShippingPolicy) -> Self {
        let totals = CartTotals::of(lines);
        let shipping = policy.shipping_for(totals.subtotal);
        Self {
            subtotal: totals.subtotal,
            shipping,
            total: totals.subtotal + shipping,
            item_count: totals.item_count,
        }
    }

    /// Amount still needed to qualify for free shipping.
    pub fn remaining_for_free_shipping(&self, policy: &ShippingPolicy) -> Money {
        if self.subtotal >= policy.free_above {
            Money::ZERO
        } else {
            policy.free_above - self.subtotal
        }
    }
}
