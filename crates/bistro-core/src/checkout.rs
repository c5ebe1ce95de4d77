//! # Checkout Payload
//!
//! The order handed to the order submitter once the cart is checked out.
//!
//! Lines carry the price they are actually charged at: under a uniform-price
//! promotion that is the substituted unit price, not the list price. The
//! header keeps the list `subtotal` so `subtotal - discount_amount ==
//! final_total` holds for every promotion mode.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{CartLine, LineId, PaymentMethod};
use crate::discount::{price_lines_with_promotion, CartTotals};
use crate::money::Money;
use crate::promotion::Promotion;

/// A topping as recorded on an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderTopping {
    pub topping_id: String,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

/// One line of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLine {
    #[ts(type = "string")]
    pub line_id: LineId,
    pub dish_id: String,
    pub dish_name: String,
    pub size: Option<String>,
    pub toppings: Vec<OrderTopping>,
    pub note: Option<String>,
    pub quantity: u32,
    /// Effective unit price after any uniform-price substitution.
    pub unit_price: Money,
    pub line_total: Money,
    pub unit_cost: Money,
}

/// The order sent for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderPayload {
    pub lines: Vec<OrderLine>,
    pub payment_method: PaymentMethod,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub final_total: Money,
    pub applied_promotion_id: Option<String>,
}

impl OrderPayload {
    /// Σ quantities across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Assembles the payload. Callers validate the cart first.
pub(crate) fn build_payload(
    lines: &[CartLine],
    promotion: Option<&Promotion>,
    payment_method: PaymentMethod,
    totals: &CartTotals,
) -> OrderPayload {
    let charged = price_lines_with_promotion(lines, promotion);

    let lines = lines
        .iter()
        .zip(charged)
        .map(|(line, price)| OrderLine {
            line_id: line.id,
            dish_id: line.dish.id.clone(),
            dish_name: line.dish.name.clone(),
            size: line.variant.as_ref().map(|v| v.size.clone()),
            toppings: line
                .toppings
                .iter()
                .map(|s| OrderTopping {
                    topping_id: s.topping.id.clone(),
                    name: s.topping.name.clone(),
                    price: s.topping.price,
                    quantity: s.quantity,
                })
                .collect(),
            note: line.note.clone(),
            quantity: line.quantity,
            unit_price: price.unit_price,
            line_total: price.line_total,
            unit_cost: line.unit_cost,
        })
        .collect();

    OrderPayload {
        lines,
        payment_method,
        subtotal: totals.subtotal,
        discount_amount: totals.discount_amount,
        final_total: totals.final_total,
        applied_promotion_id: promotion.map(|p| p.id.clone()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartStore, LineSpec};
    use crate::catalog::{Dish, Topping};
    use crate::promotion::{Discount, PromotionConditions, PromotionType, TimeSlot};
    use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone, Utc};
    use serde_json::json;

    fn money(v: i64) -> Money {
        Money::from_minor(v)
    }

    fn dish(id: &str, price: i64) -> Dish {
        Dish {
            id: id.to_string(),
            name: id.to_uppercase(),
            price: money(price),
            cost: money(price / 4),
            is_available: true,
            has_size_variants: false,
            size_variants: Vec::new(),
        }
    }

    fn evening() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 6, 15, 18, 0, 0)
            .unwrap()
    }

    fn uniform_happy_hour(price: i64) -> Promotion {
        Promotion {
            id: "hh".to_string(),
            name: "Everything 20k".to_string(),
            promotion_type: PromotionType::HappyHour,
            is_active: true,
            start_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap(),
            discount: Discount::UniformPrice(money(price)),
            conditions: PromotionConditions {
                min_order_amount: None,
                time_slots: vec![TimeSlot::new(
                    NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                )
                .unwrap()],
            },
        }
    }

    #[test]
    fn test_uniform_price_lines_carry_effective_price() {
        let mut cart = CartStore::new();
        cart.add_line(&dish("beer", 35_000), LineSpec::quantity(2)).unwrap();
        cart.add_line(&dish("peanuts", 12_000), LineSpec::default()).unwrap();
        cart.apply_promotion(&uniform_happy_hour(20_000), &evening()).unwrap();

        let payload = cart.checkout(&evening()).unwrap();

        assert_eq!(payload.lines[0].unit_price, money(20_000));
        assert_eq!(payload.lines[0].line_total, money(40_000));
        assert_eq!(payload.lines[1].unit_price, money(12_000));
        assert_eq!(payload.subtotal, money(82_000));
        assert_eq!(payload.discount_amount, money(30_000));
        assert_eq!(payload.final_total, money(52_000));

        let charged: Money = payload.lines.iter().map(|l| l.line_total).sum();
        assert_eq!(charged, payload.final_total);
        assert_eq!(payload.item_count(), 3);
    }

    #[test]
    fn test_payload_wire_shape() {
        let mut cart = CartStore::new();
        let mut with_topping = LineSpec::default().with_note("no ice");
        with_topping = with_topping.with_topping(
            Topping {
                id: "t-1".to_string(),
                name: "Lime".to_string(),
                price: money(2_000),
                description: None,
                is_available: true,
                category: "Extras".to_string(),
            },
            1,
        );
        cart.add_line(&dish("soda", 15_000), with_topping).unwrap();

        let payload = cart.checkout(&evening()).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["paymentMethod"], json!("cash"));
        assert_eq!(value["subtotal"], json!(17_000));
        assert_eq!(value["discountAmount"], json!(0));
        assert_eq!(value["finalTotal"], json!(17_000));
        assert_eq!(value["appliedPromotionId"], json!(null));
        assert_eq!(value["lines"][0]["dishId"], json!("soda"));
        assert_eq!(value["lines"][0]["toppings"][0]["toppingId"], json!("t-1"));
        assert_eq!(value["lines"][0]["note"], json!("no ice"));
    }
}
