//! # Pricing Resolver
//!
//! Turns a dish, a size variant and topping selections into a unit price and
//! a line total. Pure: the cart store persists whatever comes out of here.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  unit_price = (variant.price OR dish.price)                            │
//! │             + Σ topping.price × topping.quantity                       │
//! │                                                                         │
//! │  line_total = unit_price × quantity                                    │
//! │                                                                         │
//! │  Example: Milk Tea L (38,000) + 2× Pearl (7,000) = 52,000 per cup      │
//! │           × 3 cups = 156,000                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Topping quantities and the line quantity are independent: "2× Pearl" is
//! per cup, "3 cups" multiplies everything.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::{Dish, SizeVariant, Topping};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{validate_quantity, validate_topping_quantity};
use crate::{MAX_AMOUNT, MAX_LINE_QUANTITY};

// =============================================================================
// Topping Selection
// =============================================================================

/// A topping chosen for a line, with its per-unit quantity.
///
/// The topping is a frozen copy taken when the line was priced, like every
/// other catalog value on a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ToppingSelection {
    pub topping: Topping,
    pub quantity: u32,
}

impl ToppingSelection {
    pub fn new(topping: Topping, quantity: u32) -> Self {
        ToppingSelection { topping, quantity }
    }

    /// `topping.price × quantity`.
    pub fn total(&self) -> Money {
        self.topping.price.multiply_quantity(self.quantity)
    }
}

/// Merges duplicate toppings and drops zero quantities.
///
/// The first occurrence of a topping keeps its position; later duplicates add
/// to its quantity.
pub fn normalize_selections(selections: Vec<ToppingSelection>) -> Vec<ToppingSelection> {
    let mut merged: Vec<ToppingSelection> = Vec::with_capacity(selections.len());
    for selection in selections {
        match merged.iter_mut().find(|s| s.topping.id == selection.topping.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(selection.quantity),
            None => merged.push(selection),
        }
    }
    merged.retain(|s| s.quantity > 0);
    merged
}

/// Adds one unit of a topping, appending it if not selected yet.
pub fn add_topping_unit(selections: &mut Vec<ToppingSelection>, topping: &Topping) {
    match selections.iter_mut().find(|s| s.topping.id == topping.id) {
        Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
        None => selections.push(ToppingSelection::new(topping.clone(), 1)),
    }
}

/// Removes one unit of a topping.
///
/// When the last unit goes, the entry goes with it. Removing a topping that
/// is not selected does nothing.
pub fn remove_topping_unit(selections: &mut Vec<ToppingSelection>, topping_id: &str) {
    if let Some(pos) = selections.iter().position(|s| s.topping.id == topping_id) {
        if selections[pos].quantity > 1 {
            selections[pos].quantity -= 1;
        } else {
            selections.remove(pos);
        }
    }
}

// =============================================================================
// Quantity Steppers
// =============================================================================

/// `+` on the quantity stepper. Stops at the maximum.
pub fn increment_quantity(quantity: u32) -> u32 {
    if quantity >= MAX_LINE_QUANTITY {
        MAX_LINE_QUANTITY
    } else {
        quantity + 1
    }
}

/// `-` on the quantity stepper. A quantity of 1 stays 1.
pub fn decrement_quantity(quantity: u32) -> u32 {
    if quantity > 1 {
        quantity - 1
    } else {
        quantity
    }
}

// =============================================================================
// Variant Selection
// =============================================================================

/// The variant a line gets when the customer did not pick one: the active
/// variant flagged default, else the first active variant.
pub fn default_variant(dish: &Dish) -> Option<&SizeVariant> {
    dish.active_variants()
        .find(|v| v.is_default)
        .or_else(|| dish.active_variants().next())
}

fn check_variant(dish: &Dish, variant: Option<&SizeVariant>) -> CoreResult<()> {
    let invalid = |reason: &str| CoreError::InvalidVariant {
        dish_id: dish.id.clone(),
        reason: reason.to_string(),
    };

    match (dish.has_size_variants, variant) {
        (true, None) => Err(invalid("a size must be chosen")),
        (true, Some(chosen)) => match dish.variant(&chosen.size) {
            Some(_) => Ok(()),
            None => Err(invalid(&format!("size '{}' is not offered", chosen.size))),
        },
        (false, Some(chosen)) => Err(invalid(&format!(
            "dish has no sizes, got '{}'",
            chosen.size
        ))),
        (false, None) => Ok(()),
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Output of the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrice {
    pub unit_price: Money,
    pub line_total: Money,
}

/// Prices one cart line.
///
/// ## Errors
/// - `InvalidVariant`: the dish has sizes and none (or a foreign one) was
///   given, or the dish has no sizes and one was given
/// - `UnavailableTopping`: a selected topping is switched off
/// - `Validation`/`QuantityTooLarge`: quantity outside 1..=999
/// - `Validation`: a topping quantity above 99, or a line total above
///   `MAX_AMOUNT`
///
/// ## Example
/// ```rust
/// use bistro_core::catalog::Dish;
/// use bistro_core::money::Money;
/// use bistro_core::pricing::resolve_line_price;
///
/// let dish = Dish {
///     id: "d-1".into(),
///     name: "Spring Rolls".into(),
///     price: Money::from_minor(40_000),
///     cost: Money::zero(),
///     is_available: true,
///     has_size_variants: false,
///     size_variants: vec![],
/// };
/// let price = resolve_line_price(&dish, None, &[], 2).unwrap();
/// assert_eq!(price.line_total, Money::from_minor(80_000));
/// ```
pub fn resolve_line_price(
    dish: &Dish,
    variant: Option<&SizeVariant>,
    toppings: &[ToppingSelection],
    quantity: u32,
) -> CoreResult<LinePrice> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_LINE_QUANTITY,
        });
    }
    validate_quantity(quantity)?;
    check_variant(dish, variant)?;

    if let Some(off) = toppings.iter().find(|s| !s.topping.is_available) {
        return Err(CoreError::UnavailableTopping {
            topping_id: off.topping.id.clone(),
            name: off.topping.name.clone(),
        });
    }

    for selection in toppings {
        validate_topping_quantity(selection.quantity)?;
    }

    let base = variant.map_or(dish.price, |v| v.price);
    let line_total = toppings
        .iter()
        .filter(|s| s.quantity > 0)
        .try_fold(base, |unit, s| {
            s.topping
                .price
                .checked_mul_quantity(s.quantity)
                .and_then(|extra| unit.checked_add(extra))
        })
        .and_then(|unit| Some((unit, unit.checked_mul_quantity(quantity)?)))
        .filter(|(_, total)| total.minor() <= MAX_AMOUNT);

    match line_total {
        Some((unit_price, line_total)) => Ok(LinePrice {
            unit_price,
            line_total,
        }),
        None => Err(ValidationError::OutOfRange {
            field: "line total".to_string(),
            min: 0,
            max: MAX_AMOUNT,
        }
        .into()),
    }
}

/// Cost of one unit, for margin reporting. Toppings carry no cost.
pub fn unit_cost(dish: &Dish, variant: Option<&SizeVariant>) -> Money {
    variant.map_or(dish.cost, |v| v.cost)
}

// =============================================================================
// Unit Tests
// =============================================================================
