//! Cart update logic: pure functions over the store's lines.
//!
//! The client applies these inside `Store::try_modify`; an `Err` leaves the
//! lines exactly as they were.

use super::{AddToCart, CartLine, LineKey, MAX_LINE_QUANTITY};
use crate::error::SdkError;
use crate::shared::{LineId, Money};
use crate::validation::FieldErrors;

/// Result of an optimistic add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new provisional line was inserted.
    Inserted(LineId),
    /// An existing line for the same triple was incremented.
    Incremented { id: LineId, previous: u32 },
}

impl AddOutcome {
    pub fn line_id(&self) -> &LineId {
        match self {
            AddOutcome::Inserted(id) => id,
            AddOutcome::Incremented { id, .. } => id,
        }
    }
}

/// Add `item`, merging into an existing line with the same identity triple.
pub fn apply_add(lines: &mut Vec<CartLine>, item: &AddToCart) -> Result<AddOutcome, SdkError> {
    check_requested_quantity(item.quantity)?;
    let key = item.line_key();

    if let Some(line) = lines.iter_mut().find(|l| l.matches(&key)) {
        let next = line.quantity + item.quantity;
        if next > MAX_LINE_QUANTITY {
            return Err(SdkError::QuantityLimit {
                max: MAX_LINE_QUANTITY,
            });
        }
        let previous = line.quantity;
        line.quantity = next;
        return Ok(AddOutcome::Incremented {
            id: line.id.clone(),
            previous,
        });
    }

    if item.quantity > MAX_LINE_QUANTITY {
        return Err(SdkError::QuantityLimit {
            max: MAX_LINE_QUANTITY,
        });
    }
    let line = CartLine::provisional(item);
    let id = line.id.clone();
    lines.push(line);
    Ok(AddOutcome::Inserted(id))
}

/// Remove a line by id. `None` if no such line.
pub fn apply_remove(lines: &mut Vec<CartLine>, id: &LineId) -> Option<CartLine> {
    let pos = lines.iter().position(|l| &l.id == id)?;
    Some(lines.remove(pos))
}

/// Set a line's quantity. Returns the line's key and previous quantity.
pub fn apply_quantity(
    lines: &mut [CartLine],
    id: &LineId,
    quantity: u32,
) -> Result<(LineKey, u32), SdkError> {
    check_requested_quantity(quantity)?;
    if quantity > MAX_LINE_QUANTITY {
        return Err(SdkError::QuantityLimit {
            max: MAX_LINE_QUANTITY,
        });
    }
    let line = lines
        .iter_mut()
        .find(|l| &l.id == id)
        .ok_or_else(|| SdkError::Other(format!("Cart line not found: {}", id)))?;
    let previous = line.quantity;
    line.quantity = quantity;
    Ok((line.line_key(), previous))
}

/// The single call that brings the server's copy of one line in line with
/// the local one.
#[derive(Debug, Clone, PartialEq)]
pub enum LineSync {
    Unchanged,
    /// The server has no such line: create it with the local quantity.
    Add(CartLine),
    /// Both have the line: set the server's quantity.
    Update(u32),
    /// The line is gone locally.
    Remove,
}

/// Compare the local lines with the server-confirmed ones for `key`.
pub fn diff_line(local: &[CartLine], confirmed: &[CartLine], key: &LineKey) -> LineSync {
    let wanted = local.iter().find(|l| l.matches(key));
    let saved = confirmed.iter().find(|l| l.matches(key)).map(|l| l.quantity);
    match (wanted, saved) {
        (Some(line), None) => LineSync::Add(line.clone()),
        (Some(line), Some(quantity)) if line.quantity != quantity => {
            LineSync::Update(line.quantity)
        }
        (None, Some(_)) => LineSync::Remove,
        _ => LineSync::Unchanged,
    }
}

fn check_requested_quantity(quantity: u32) -> Result<(), SdkError> {
    if quantity == 0 {
        let mut errors = FieldErrors::new();
        errors.add("quantity", "Quantity must be at least 1");
        return Err(errors.into());
    }
    Ok(())
}

/// Totals derived from the current lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    pub subtotal: Money,
    /// Sum of quantities across lines.
    pub item_count: u32,
    pub line_count: usize,
}

impl CartTotals {
    pub fn of(lines: &[CartLine]) -> Self {
        CartTotals {
            subtotal: lines.iter().map(CartLine::line_total).sum(),
            item_count: lines.iter().map(|l| l.quantity).sum(),
            line_count: lines.len(),
        }
    }
}
