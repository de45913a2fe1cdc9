//! Pure bookkeeping: prices, totals and quantity arithmetic.

use std::str::FromStr;
use thiserror::Error;

use crate::entities::{cart_item, product};
use crate::ledger::error::RuleViolation;

/// Catalog price after the discount percentage.
pub fn special_price(price: f64, discount: f64) -> f64 {
    price - (discount / 100.0 * price)
}

pub fn line_total(price: f64, quantity: i32) -> f64 {
    price * f64::from(quantity)
}

/// Full resummation over the remaining items of a cart.
pub fn cart_total<'a>(items: impl IntoIterator<Item = &'a cart_item::Model>) -> f64 {
    items
        .into_iter()
        .map(|item| line_total(item.price, item.quantity))
        .sum()
}

/// Stock gate for putting `requested` units of a product into a cart.
pub fn check_stock(product: &product::Model, requested: i32) -> Result<(), RuleViolation> {
    if product.quantity <= 0 {
        return Err(RuleViolation::OutOfStock {
            product_id: product.id,
        });
    }
    if product.quantity < requested {
        return Err(RuleViolation::InsufficientStock {
            product_id: product.id,
            requested,
            available: product.quantity,
        });
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantityChange {
    Increment,
    Decrement,
    SetTo(i32),
}

impl QuantityChange {
    /// Resulting line quantity, zero included (zero means "drop the item").
    pub fn apply(self, current: i32) -> Result<i32, RuleViolation> {
        let resulting = match self {
            QuantityChange::Increment => current.saturating_add(1),
            QuantityChange::Decrement => current.saturating_sub(1),
            QuantityChange::SetTo(quantity) => quantity,
        };
        if resulting < 0 {
            return Err(RuleViolation::NegativeQuantity { current, resulting });
        }
        Ok(resulting)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown quantity operation `{0}`, expected `increment` or `decrement`")]
pub struct UnknownOperation(pub String);

impl FromStr for QuantityChange {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "increment" | "add" => Ok(QuantityChange::Increment),
            "decrement" | "delete" => Ok(QuantityChange::Decrement),
            _ => Err(UnknownOperation(s.to_owned())),
        }
    }
}
