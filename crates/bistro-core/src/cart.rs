//! # Cart Store
//!
//! The single active cart of a session: ordered lines, at most one applied
//! promotion and the chosen payment method.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CartStore Operations                               │
//! │                                                                         │
//! │  Operation             Work                          State Change       │
//! │  ─────────             ────                          ────────────       │
//! │                                                                         │
//! │  add_line() ─────────► resolve_line_price() ───────► lines.push(line)   │
//! │                                                                         │
//! │  set_quantity() ─────► resolve_line_price() ───────► lines[i] = line'   │
//! │  add_topping()                                                          │
//! │                                                                         │
//! │  apply_promotion() ──► eligibility + minimum ──────► promotion = Some   │
//! │                                                                         │
//! │  clear() ────────────────────────────────────────► lines, promotion,   │
//! │                                                      payment reset      │
//! │                                                                         │
//! │  Every successful mutation: revision += 1, totals recomputed once.      │
//! │  A failed mutation changes nothing.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each operation builds the new line (or promotion) completely before it
//! touches `self`, so an error can never leave a half-updated cart behind.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::{Dish, SizeVariant, Topping};
use crate::checkout::{build_payload, OrderPayload};
use crate::discount::{check_minimum, compute_totals, CartTotals};
use crate::eligibility::{ensure_selectable, ensure_still_eligible};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{
    add_topping_unit, decrement_quantity, default_variant, increment_quantity, normalize_selections,
    remove_topping_unit, resolve_line_price, unit_cost, ToppingSelection,
};
use crate::promotion::Promotion;
use crate::validation::{validate_cart_size, validate_note};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// Identifier of a cart line. Fresh for every add, even of the same dish.
pub type LineId = Uuid;

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    BankTransfer,
    EWallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::EWallet => "e_wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "e_wallet" | "ewallet" => Ok(PaymentMethod::EWallet),
            _ => Err(ValidationError::InvalidFormat {
                field: "paymentMethod".to_string(),
                reason: format!("unknown payment method '{}'", s),
            }),
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One priced line of the cart.
///
/// ## Invariants
/// - `line_total == unit_price × quantity`
/// - `unit_price == (variant.price or dish.price) + Σ topping.price × qty`
/// - `1 <= quantity <= 999`
///
/// Dish, variant and toppings are frozen copies: a catalog refresh after the
/// line was added does not reprice it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    #[ts(type = "string")]
    pub id: LineId,
    pub dish: Dish,
    pub variant: Option<SizeVariant>,
    pub toppings: Vec<ToppingSelection>,
    pub note: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
    /// Variant cost, else dish cost. Toppings carry none.
    pub unit_cost: Money,
}

impl CartLine {
    /// Copy of this line priced with new toppings and quantity.
    fn repriced(&self, toppings: Vec<ToppingSelection>, quantity: u32) -> CoreResult<CartLine> {
        let price = resolve_line_price(&self.dish, self.variant.as_ref(), &toppings, quantity)?;
        Ok(CartLine {
            toppings,
            quantity,
            unit_price: price.unit_price,
            line_total: price.line_total,
            ..self.clone()
        })
    }
}

/// What the customer picked for a new line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpec {
    /// Size label. `None` takes the dish's default variant.
    pub variant_size: Option<String>,
    pub toppings: Vec<ToppingSelection>,
    pub quantity: u32,
    pub note: Option<String>,
}

impl Default for LineSpec {
    fn default() -> Self {
        LineSpec {
            variant_size: None,
            toppings: Vec::new(),
            quantity: 1,
            note: None,
        }
    }
}

impl LineSpec {
    pub fn quantity(quantity: u32) -> Self {
        LineSpec {
            quantity,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.variant_size = Some(size.into());
        self
    }

    pub fn with_topping(mut self, topping: Topping, quantity: u32) -> Self {
        self.toppings.push(ToppingSelection::new(topping, quantity));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// Owns the cart. Mutated only through its methods.
#[derive(Debug, Clone)]
pub struct CartStore {
    lines: Vec<CartLine>,
    applied_promotion: Option<Promotion>,
    payment_method: PaymentMethod,
    default_payment_method: PaymentMethod,
    revision: u64,
    totals: CartTotals,
}

impl Default for CartStore {
    fn default() -> Self {
        CartStore::with_default_payment(PaymentMethod::default())
    }
}

impl CartStore {
    /// Creates an empty cart paying cash.
    pub fn new() -> Self {
        CartStore::default()
    }

    /// Creates an empty cart whose payment method starts at (and resets to)
    /// `method`.
    pub fn with_default_payment(method: PaymentMethod) -> Self {
        CartStore {
            lines: Vec::new(),
            applied_promotion: None,
            payment_method: method,
            default_payment_method: method,
            revision: 0,
            totals: CartTotals::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn applied_promotion(&self) -> Option<&Promotion> {
        self.applied_promotion.as_ref()
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Σ line totals at list price. Zero for an empty cart.
    pub fn subtotal(&self) -> Money {
        self.totals.subtotal
    }

    /// Totals as of the last mutation.
    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    // -------------------------------------------------------------------------
    // Lines
    // -------------------------------------------------------------------------

    /// Prices and appends a new line.
    ///
    /// Never merges with an existing line of the same dish: each add gets its
    /// own id, toppings and note.
    pub fn add_line(&mut self, dish: &Dish, spec: LineSpec) -> CoreResult<LineId> {
        if !dish.is_available {
            return Err(CoreError::DishUnavailable(dish.id.clone()));
        }
        validate_cart_size(self.lines.len()).map_err(|_| CoreError::CartTooLarge { max: MAX_CART_LINES })?;

        let variant = match spec.variant_size.as_deref() {
            Some(size) => Some(dish.variant(size).cloned().ok_or_else(|| CoreError::InvalidVariant {
                dish_id: dish.id.clone(),
                reason: format!("size '{}' is not offered", size),
            })?),
            None if dish.has_size_variants => default_variant(dish).cloned(),
            None => None,
        };
        let toppings = normalize_selections(spec.toppings);
        let note = validate_note(spec.note.as_deref())?;
        let price = resolve_line_price(dish, variant.as_ref(), &toppings, spec.quantity)?;

        let line = CartLine {
            id: Uuid::new_v4(),
            unit_cost: unit_cost(dish, variant.as_ref()),
            dish: dish.clone(),
            variant,
            toppings,
            note,
            quantity: spec.quantity,
            unit_price: price.unit_price,
            line_total: price.line_total,
        };
        let id = line.id;

        self.lines.push(line);
        self.commit();
        debug!(line_id = %id, dish_id = %dish.id, revision = self.revision, "Line added");
        Ok(id)
    }

    /// Removes a line. Returns whether one was removed; unknown ids are a no-op.
    pub fn remove_line(&mut self, id: LineId) -> bool {
        let Some(index) = self.lines.iter().position(|l| l.id == id) else {
            return false;
        };
        self.lines.remove(index);
        self.commit();
        debug!(line_id = %id, revision = self.revision, "Line removed");
        true
    }

    /// Sets a line's quantity.
    ///
    /// Zero is rejected rather than treated as a removal.
    pub fn set_quantity(&mut self, id: LineId, quantity: u32) -> CoreResult<()> {
        if quantity < 1 {
            return Err(CoreError::InvalidQuantity(quantity));
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        let index = self.index_of(id)?;
        let line = &self.lines[index];
        let updated = line.repriced(line.toppings.clone(), quantity)?;
        self.replace_line(index, updated);
        debug!(line_id = %id, quantity, revision = self.revision, "Quantity set");
        Ok(())
    }

    /// `+` on a line. Returns the new quantity.
    pub fn increment_line(&mut self, id: LineId) -> CoreResult<u32> {
        let current = self.lines[self.index_of(id)?].quantity;
        self.step_quantity(id, current, increment_quantity(current))
    }

    /// `-` on a line. A line at quantity 1 stays at 1. Returns the new quantity.
    pub fn decrement_line(&mut self, id: LineId) -> CoreResult<u32> {
        let current = self.lines[self.index_of(id)?].quantity;
        self.step_quantity(id, current, decrement_quantity(current))
    }

    fn step_quantity(&mut self, id: LineId, current: u32, next: u32) -> CoreResult<u32> {
        if next != current {
            self.set_quantity(id, next)?;
        }
        Ok(next)
    }

    /// Adds one unit of a topping to a line and reprices it.
    pub fn add_topping(&mut self, id: LineId, topping: &Topping) -> CoreResult<()> {
        let index = self.index_of(id)?;
        let line = &self.lines[index];

        let mut toppings = line.toppings.clone();
        add_topping_unit(&mut toppings, topping);
        let updated = line.repriced(toppings, line.quantity)?;

        self.replace_line(index, updated);
        debug!(line_id = %id, topping_id = %topping.id, revision = self.revision, "Topping added");
        Ok(())
    }

    /// Removes one unit of a topping from a line. Removing a topping the line
    /// does not have changes nothing.
    pub fn remove_topping(&mut self, id: LineId, topping_id: &str) -> CoreResult<()> {
        let index = self.index_of(id)?;
        let line = &self.lines[index];

        let mut toppings = line.toppings.clone();
        remove_topping_unit(&mut toppings, topping_id);
        if toppings == line.toppings {
            return Ok(());
        }
        let updated = line.repriced(toppings, line.quantity)?;

        self.replace_line(index, updated);
        debug!(line_id = %id, topping_id, revision = self.revision, "Topping removed");
        Ok(())
    }

    /// Swaps a line's whole topping selection.
    pub fn replace_toppings(&mut self, id: LineId, selections: Vec<ToppingSelection>) -> CoreResult<()> {
        let index = self.index_of(id)?;
        let line = &self.lines[index];
        let updated = line.repriced(normalize_selections(selections), line.quantity)?;

        self.replace_line(index, updated);
        debug!(line_id = %id, revision = self.revision, "Toppings replaced");
        Ok(())
    }

    /// Sets or clears a line's kitchen note.
    pub fn set_note(&mut self, id: LineId, note: Option<&str>) -> CoreResult<()> {
        let index = self.index_of(id)?;
        let note = validate_note(note)?;

        let updated = CartLine {
            note,
            ..self.lines[index].clone()
        };
        self.replace_line(index, updated);
        debug!(line_id = %id, revision = self.revision, "Note set");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Promotion & Payment
    // -------------------------------------------------------------------------

    /// Applies a promotion, replacing any previous one.
    ///
    /// ## Errors
    /// - `PromotionNotEligible`: not selectable at `now`
    /// - `MinimumOrderNotMet`: subtotal below the promotion's minimum
    ///
    /// On error the previously applied promotion stays.
    pub fn apply_promotion(&mut self, promotion: &Promotion, now: &DateTime<FixedOffset>) -> CoreResult<()> {
        ensure_selectable(promotion, now)?;
        check_minimum(self.subtotal(), promotion)?;

        self.applied_promotion = Some(promotion.clone());
        self.commit();
        debug!(promotion_id = %promotion.id, revision = self.revision, "Promotion applied");
        Ok(())
    }

    /// Drops the applied promotion, returning it.
    pub fn remove_promotion(&mut self) -> Option<Promotion> {
        let removed = self.applied_promotion.take();
        if removed.is_some() {
            self.commit();
            debug!(revision = self.revision, "Promotion removed");
        }
        removed
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
        self.commit();
        debug!(payment_method = %method, revision = self.revision, "Payment method set");
    }

    /// Empties the cart, drops the promotion and resets the payment method,
    /// as one mutation.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.applied_promotion = None;
        self.payment_method = self.default_payment_method;
        self.commit();
        debug!(revision = self.revision, "Cart cleared");
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Builds the order payload for submission.
    ///
    /// The applied promotion is checked again at `now`: it may have lapsed, or
    /// lines may have been removed below its minimum, since it was applied.
    /// The cart is left as it is; clearing after a successful submission is
    /// the caller's job.
    pub fn checkout(&self, now: &DateTime<FixedOffset>) -> CoreResult<OrderPayload> {
        self.checkout_with(self.applied_promotion.as_ref(), now)
    }

    /// Like [`checkout`](Self::checkout), but re-checks the applied promotion
    /// against `current`, its copy in the latest promotion catalog.
    ///
    /// ## Errors
    /// - `EmptyCart`: no lines
    /// - `PromotionExpired`: the promotion is gone from the catalog, was
    ///   switched off, or left its window or time slot
    /// - `MinimumOrderNotMet`: the subtotal fell below the current minimum
    ///
    /// The payload is priced with `current`, so a discount edited since the
    /// promotion was applied is the one charged.
    pub fn checkout_with(
        &self,
        current: Option<&Promotion>,
        now: &DateTime<FixedOffset>,
    ) -> CoreResult<OrderPayload> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let Some(applied) = &self.applied_promotion else {
            return Ok(build_payload(&self.lines, None, self.payment_method, &self.totals));
        };

        let promotion = match current {
            Some(promotion) if promotion.id == applied.id => promotion,
            _ => {
                return Err(CoreError::PromotionExpired {
                    promotion_id: applied.id.clone(),
                })
            }
        };
        ensure_still_eligible(promotion, now)?;
        check_minimum(self.subtotal(), promotion)?;

        let totals = compute_totals(&self.lines, Some(promotion));
        Ok(build_payload(&self.lines, Some(promotion), self.payment_method, &totals))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn index_of(&self, id: LineId) -> CoreResult<usize> {
        self.lines
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| CoreError::LineNotFound(id.to_string()))
    }

    fn replace_line(&mut self, index: usize, line: CartLine) {
        self.lines[index] = line;
        self.commit();
    }

    fn commit(&mut self) {
        self.revision += 1;
        self.totals = compute_totals(&self.lines, self.applied_promotion.as_ref());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
