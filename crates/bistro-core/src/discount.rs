//! # Discount Engine
//!
//! Computes what an applied promotion takes off the cart.
//!
//! ## Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Percentage   discount = round(subtotal × rate), capped at subtotal     │
//! │  FixedAmount  discount = min(amount, subtotal)                          │
//! │  UniformPrice each line's unit price becomes min(unit, uniform)         │
//! │               BEFORE the subtotal is aggregated                         │
//! │                                                                         │
//! │  final_total = max(subtotal - discount, 0)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Uniform price is the one mode that is not "subtract from the subtotal":
//! it rewrites line prices upstream, so `compute_discount` contributes
//! nothing for it and `compute_totals` reports the savings as the difference
//! between list and substituted subtotals.
//!
//! The minimum order amount is always checked against the list subtotal.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::LinePrice;
use crate::promotion::{Discount, Promotion};

// =============================================================================
// Discount Outcome
// =============================================================================

/// Result of `compute_discount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountOutcome {
    pub discount_amount: Money,
    pub final_total: Money,
}

impl DiscountOutcome {
    fn undiscounted(subtotal: Money) -> Self {
        DiscountOutcome {
            discount_amount: Money::zero(),
            final_total: subtotal.floor_zero(),
        }
    }
}

/// Rejects the promotion when the order is below its minimum.
pub fn check_minimum(subtotal: Money, promotion: &Promotion) -> CoreResult<()> {
    match promotion.conditions.min_order_amount {
        Some(required) if subtotal < required => {
            Err(CoreError::MinimumOrderNotMet { required, subtotal })
        }
        _ => Ok(()),
    }
}

/// Subtractive part of a discount. Never more than the subtotal.
fn subtractive_amount(subtotal: Money, discount: Discount) -> Money {
    let amount = match discount {
        Discount::Percentage(rate) => subtotal.percent_of(rate),
        Discount::FixedAmount(amount) => amount,
        Discount::UniformPrice(_) => Money::zero(),
    };
    amount.min(subtotal.floor_zero())
}

/// Discount of a promotion on a subtotal.
///
/// ## Errors
/// `MinimumOrderNotMet` when the promotion's minimum is above `subtotal`.
/// The caller surfaces it; nothing here drops the promotion.
///
/// ## Example
/// ```rust
/// use bistro_core::discount::compute_discount;
/// use bistro_core::money::Money;
///
/// let outcome = compute_discount(Money::from_minor(50_000), None).unwrap();
/// assert_eq!(outcome.final_total, Money::from_minor(50_000));
/// ```
pub fn compute_discount(subtotal: Money, promotion: Option<&Promotion>) -> CoreResult<DiscountOutcome> {
    let Some(promotion) = promotion else {
        return Ok(DiscountOutcome::undiscounted(subtotal));
    };

    check_minimum(subtotal, promotion)?;

    let discount_amount = subtractive_amount(subtotal, promotion.discount);
    Ok(DiscountOutcome {
        discount_amount,
        final_total: (subtotal - discount_amount).floor_zero(),
    })
}

/// Unit price a line is charged at under the promotion.
///
/// Only a uniform-price promotion changes it, and only downwards.
pub fn effective_unit_price(unit_price: Money, promotion: Option<&Promotion>) -> Money {
    match promotion.map(|p| p.discount) {
        Some(Discount::UniformPrice(uniform)) => unit_price.min(uniform),
        _ => unit_price,
    }
}

/// Prices every line as it will be charged under the promotion.
///
/// Same order as `lines`. Without a uniform-price promotion this is just the
/// list prices back.
pub fn price_lines_with_promotion(lines: &[CartLine], promotion: Option<&Promotion>) -> Vec<LinePrice> {
    lines
        .iter()
        .map(|line| {
            let unit_price = effective_unit_price(line.unit_price, promotion);
            LinePrice {
                unit_price,
                line_total: unit_price.multiply_quantity(line.quantity),
            }
        })
        .collect()
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Where the applied promotion stands against the current cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export)]
pub enum PromotionStatus {
    None,
    Applied {
        #[serde(rename = "promotionId")]
        promotion_id: String,
    },
    /// Lines were removed after the promotion was applied. No discount is
    /// shown and checkout will refuse until the cart grows again.
    MinimumNotMet {
        #[serde(rename = "promotionId")]
        promotion_id: String,
        required: Money,
    },
}

/// Totals shown under the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub item_count: u32,
    /// Σ line totals at list price.
    pub subtotal: Money,
    /// Everything the promotion takes off, uniform-price savings included.
    pub discount_amount: Money,
    pub final_total: Money,
    pub promotion_status: PromotionStatus,
}

impl Default for CartTotals {
    fn default() -> Self {
        CartTotals {
            line_count: 0,
            item_count: 0,
            subtotal: Money::zero(),
            discount_amount: Money::zero(),
            final_total: Money::zero(),
            promotion_status: PromotionStatus::None,
        }
    }
}

/// Totals for a set of lines under an (optional) promotion.
///
/// Does not fail: a promotion whose minimum is no longer met shows up as
/// `PromotionStatus::MinimumNotMet` with no discount.
pub fn compute_totals(lines: &[CartLine], promotion: Option<&Promotion>) -> CartTotals {
    let subtotal: Money = lines.iter().map(|l| l.line_total).sum();
    let item_count: u32 = lines.iter().map(|l| l.quantity).sum();
    let undiscounted = CartTotals {
        line_count: lines.len(),
        item_count,
        subtotal,
        discount_amount: Money::zero(),
        final_total: subtotal,
        promotion_status: PromotionStatus::None,
    };

    let Some(promotion) = promotion else {
        return undiscounted;
    };

    if let Err(CoreError::MinimumOrderNotMet { required, .. }) = check_minimum(subtotal, promotion) {
        return CartTotals {
            promotion_status: PromotionStatus::MinimumNotMet {
                promotion_id: promotion.id.clone(),
                required,
            },
            ..undiscounted
        };
    }

    let effective_subtotal: Money = price_lines_with_promotion(lines, Some(promotion))
        .iter()
        .map(|p| p.line_total)
        .sum();
    let uniform_savings = subtotal - effective_subtotal;
    let discount_amount = uniform_savings + subtractive_amount(effective_subtotal, promotion.discount);

    CartTotals {
        discount_amount,
        final_total: (subtotal - discount_amount).floor_zero(),
        promotion_status: PromotionStatus::Applied {
            promotion_id: promotion.id.clone(),
        },
        ..undiscounted
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::catalog::Dish;
    use crate::money::Percent;
    use crate::promotion::{PromotionConditions, PromotionType};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn promotion(promotion_type: PromotionType, discount: Discount) -> Promotion {
        Promotion {
            id: "p-1".to_string(),
            name: "Promo".to_string(),
            promotion_type,
            is_active: true,
            start_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap(),
            discount,
            conditions: PromotionConditions::default(),
        }
    }

    fn line(unit_price: i64, quantity: u32) -> CartLine {
        let unit_price = Money::from_minor(unit_price);
        CartLine {
            id: Uuid::new_v4(),
            dish: Dish {
                id: "d-1".to_string(),
                name: "Dish".to_string(),
                price: unit_price,
                cost: Money::zero(),
                is_available: true,
                has_size_variants: false,
                size_variants: Vec::new(),
            },
            variant: None,
            toppings: Vec::new(),
            note: None,
            quantity,
            unit_price,
            line_total: unit_price.multiply_quantity(quantity),
            unit_cost: Money::zero(),
        }
    }

    fn money(v: i64) -> Money {
        Money::from_minor(v)
    }

    #[test]
    fn test_no_promotion() {
        let outcome = compute_discount(money(100_000), None).unwrap();
        assert_eq!(outcome.discount_amount, Money::zero());
        assert_eq!(outcome.final_total, money(100_000));
    }

    #[test]
    fn test_order_percentage() {
        let promo = promotion(PromotionType::OrderPercentage, Discount::Percentage(Percent::from_bps(2_000)));
        let outcome = compute_discount(money(100_000), Some(&promo)).unwrap();
        assert_eq!(outcome.discount_amount, money(20_000));
        assert_eq!(outcome.final_total, money(80_000));
    }

    #[test]
    fn test_full_percentage_never_goes_negative() {
        let promo = promotion(PromotionType::OrderPercentage, Discount::Percentage(Percent::FULL));
        let outcome = compute_discount(money(42_000), Some(&promo)).unwrap();
        assert_eq!(outcome.discount_amount, money(42_000));
        assert_eq!(outcome.final_total, Money::zero());
    }

    #[test]
    fn test_order_fixed_is_capped() {
        let promo = promotion(PromotionType::OrderFixed, Discount::FixedAmount(money(50_000)));
        let outcome = compute_discount(money(30_000), Some(&promo)).unwrap();
        assert_eq!(outcome.discount_amount, money(30_000));
        assert_eq!(outcome.final_total, Money::zero());
    }

    #[test]
    fn test_happy_hour_percentage_and_fixed() {
        let pct = promotion(PromotionType::HappyHour, Discount::Percentage(Percent::from_bps(1_500)));
        assert_eq!(compute_discount(money(200_000), Some(&pct)).unwrap().discount_amount, money(30_000));

        let fixed = promotion(PromotionType::HappyHour, Discount::FixedAmount(money(10_000)));
        assert_eq!(compute_discount(money(200_000), Some(&fixed)).unwrap().final_total, money(190_000));
    }

    #[test]
    fn test_minimum_order_not_met() {
        let mut promo = promotion(PromotionType::OrderFixed, Discount::FixedAmount(money(20_000)));
        promo.conditions.min_order_amount = Some(money(200_000));

        let err = compute_discount(money(150_000), Some(&promo)).unwrap_err();
        assert_eq!(
            err,
            CoreError::MinimumOrderNotMet {
                required: money(200_000),
                subtotal: money(150_000),
            }
        );

        // exactly the minimum is enough
        assert!(compute_discount(money(200_000), Some(&promo)).is_ok());
    }

    #[test]
    fn test_uniform_price_is_not_subtracted() {
        let promo = promotion(PromotionType::HappyHour, Discount::UniformPrice(money(20_000)));
        let outcome = compute_discount(money(90_000), Some(&promo)).unwrap();
        assert_eq!(outcome.discount_amount, Money::zero());
    }

    #[test]
    fn test_totals_with_uniform_price_substitutes_lines() {
        let promo = promotion(PromotionType::HappyHour, Discount::UniformPrice(money(20_000)));
        // 35,000 × 2 → 20,000 × 2; 15,000 × 1 stays (never raised)
        let lines = vec![line(35_000, 2), line(15_000, 1)];

        let totals = compute_totals(&lines, Some(&promo));
        assert_eq!(totals.subtotal, money(85_000));
        assert_eq!(totals.discount_amount, money(30_000));
        assert_eq!(totals.final_total, money(55_000));
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.line_count, 2);
    }

    #[test]
    fn test_totals_report_minimum_not_met() {
        let mut promo = promotion(PromotionType::OrderPercentage, Discount::Percentage(Percent::from_bps(1_000)));
        promo.conditions.min_order_amount = Some(money(100_000));

        let totals = compute_totals(&[line(50_000, 1)], Some(&promo));
        assert_eq!(totals.discount_amount, Money::zero());
        assert_eq!(totals.final_total, money(50_000));
        assert!(matches!(totals.promotion_status, PromotionStatus::MinimumNotMet { .. }));

        let totals = compute_totals(&[line(50_000, 2)], Some(&promo));
        assert_eq!(totals.discount_amount, money(10_000));
        assert!(matches!(totals.promotion_status, PromotionStatus::Applied { .. }));
    }

    #[test]
    fn test_empty_cart_totals() {
        let totals = compute_totals(&[], None);
        assert_eq!(totals, CartTotals::default());
    }
}
