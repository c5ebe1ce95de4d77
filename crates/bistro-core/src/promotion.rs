//! # Promotion Types
//!
//! Promotion definitions and their ingestion from provider records.
//!
//! ## Wire vs Domain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PromotionRecord (wire)              Promotion (domain)                 │
//! │  ──────────────────────              ──────────────────                 │
//! │  discount: {                         discount: Discount::               │
//! │    percentage?: 20,        ──►         Percentage(2000 bps)             │
//! │    fixedAmount?: null,                 | FixedAmount(Money)             │
//! │    uniformPrice?: null                 | UniformPrice(Money)            │
//! │  }                                                                      │
//! │  timeSlots: [{start:"17:00",  ──►    time_slots: [TimeSlot {            │
//! │               end:"19:00"}]            17:00..19:00 }]                  │
//! │                                                                         │
//! │  Zero or several discount fields, bad clock strings, reversed windows   │
//! │  are rejected HERE, once. Nothing downstream re-checks the shape.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::RejectedRecord;
use crate::error::ValidationError;
use crate::money::{Money, Percent};
use crate::validation::{parse_clock_time, validate_amount, validate_required};

fn default_true() -> bool {
    true
}

// =============================================================================
// Promotion Type
// =============================================================================

/// The promotion kind as named by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PromotionType {
    OrderPercentage,
    OrderFixed,
    HappyHour,
    ItemPercentage,
    ItemFixed,
    /// Any kind this engine does not know. Never selectable from the cart.
    #[serde(other)]
    Other,
}

impl PromotionType {
    /// Kinds that may be applied to the whole cart.
    pub fn is_order_level(&self) -> bool {
        matches!(
            self,
            PromotionType::OrderPercentage | PromotionType::OrderFixed | PromotionType::HappyHour
        )
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Exactly one discount mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
#[ts(export)]
pub enum Discount {
    /// Share of the subtotal.
    Percentage(Percent),
    /// Flat amount off the subtotal.
    FixedAmount(Money),
    /// Replaces line unit prices before aggregation (happy hour only).
    UniformPrice(Money),
}

// =============================================================================
// Time Slot
// =============================================================================

/// A local clock window `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimeSlot {
    #[ts(as = "String")]
    start: NaiveTime,
    #[ts(as = "String")]
    end: NaiveTime,
}

impl TimeSlot {
    /// Creates a slot. Slots may not cross midnight.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidFormat {
                field: "timeSlots".to_string(),
                reason: format!("start {} must be before end {}", start, end),
            });
        }
        Ok(TimeSlot { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Inclusive start, exclusive end: 19:00 belongs to the slot that starts
    /// at 19:00, never to the one that ends there.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// Extra requirements a promotion places on the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PromotionConditions {
    pub min_order_amount: Option<Money>,
    pub time_slots: Vec<TimeSlot>,
}

/// A validated promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Promotion {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub promotion_type: PromotionType,
    pub is_active: bool,
    /// Inclusive.
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    /// Inclusive.
    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,
    pub discount: Discount,
    pub conditions: PromotionConditions,
}

impl Promotion {
    /// Whether `now` lies in `[start_date, end_date]`.
    pub fn window_contains(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }

    /// Whether a local clock time hits one of the time slots.
    pub fn slot_contains(&self, time: NaiveTime) -> bool {
        self.conditions.time_slots.iter().any(|slot| slot.contains(time))
    }
}

// =============================================================================
// Wire Records
// =============================================================================

/// Discount object as sent by the provider: presence of a field selects the
/// mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRecord {
    pub percentage: Option<f64>,
    pub fixed_amount: Option<Money>,
    pub uniform_price: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlotRecord {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionsRecord {
    pub min_order_amount: Option<Money>,
    pub time_slots: Option<Vec<TimeSlotRecord>>,
}

/// Promotion as sent by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub promotion_type: PromotionType,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub discount: DiscountRecord,
    #[serde(default)]
    pub conditions: ConditionsRecord,
}

impl TryFrom<DiscountRecord> for Discount {
    type Error = ValidationError;

    fn try_from(record: DiscountRecord) -> Result<Self, Self::Error> {
        let discount = match (record.percentage, record.fixed_amount, record.uniform_price) {
            (Some(pct), None, None) => {
                let rate = Percent::from_percentage(pct).ok_or_else(|| {
                    ValidationError::OutOfRange {
                        field: "discount.percentage".to_string(),
                        min: 0,
                        max: 100,
                    }
                })?;
                Discount::Percentage(rate)
            }
            (None, Some(amount), None) => {
                validate_amount("discount.fixedAmount", amount)?;
                Discount::FixedAmount(amount)
            }
            (None, None, Some(price)) => {
                validate_amount("discount.uniformPrice", price)?;
                Discount::UniformPrice(price)
            }
            (None, None, None) => {
                return Err(ValidationError::Ambiguous {
                    field: "discount".to_string(),
                    reason: "no discount field is set".to_string(),
                })
            }
            _ => {
                return Err(ValidationError::Ambiguous {
                    field: "discount".to_string(),
                    reason: "more than one discount field is set".to_string(),
                })
            }
        };
        Ok(discount)
    }
}

fn mode_mismatch(promotion_type: PromotionType, expected: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "discount".to_string(),
        reason: format!("{:?} requires {}", promotion_type, expected),
    }
}

impl TryFrom<PromotionRecord> for Promotion {
    type Error = ValidationError;

    fn try_from(record: PromotionRecord) -> Result<Self, Self::Error> {
        validate_required("promotion._id", &record.id)?;
        validate_required("promotion.name", &record.name)?;

        if record.start_date > record.end_date {
            return Err(ValidationError::InvalidFormat {
                field: "endDate".to_string(),
                reason: "endDate is before startDate".to_string(),
            });
        }

        let discount = Discount::try_from(record.discount)?;
        match (record.promotion_type, discount) {
            (PromotionType::OrderPercentage | PromotionType::ItemPercentage, Discount::Percentage(_)) => {}
            (PromotionType::OrderPercentage | PromotionType::ItemPercentage, _) => {
                return Err(mode_mismatch(record.promotion_type, "percentage"))
            }
            (PromotionType::OrderFixed | PromotionType::ItemFixed, Discount::FixedAmount(_)) => {}
            (PromotionType::OrderFixed | PromotionType::ItemFixed, _) => {
                return Err(mode_mismatch(record.promotion_type, "fixedAmount"))
            }
            (PromotionType::HappyHour, _) => {}
            (_, Discount::UniformPrice(_)) => {
                return Err(mode_mismatch(record.promotion_type, "a non-uniform discount"))
            }
            (PromotionType::Other, _) => {}
        }

        if let Some(min) = record.conditions.min_order_amount {
            validate_amount("conditions.minOrderAmount", min)?;
        }

        let time_slots = record
            .conditions
            .time_slots
            .unwrap_or_default()
            .iter()
            .map(|slot| {
                let start = parse_clock_time("timeSlots.start", &slot.start)?;
                let end = parse_clock_time("timeSlots.end", &slot.end)?;
                TimeSlot::new(start, end)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if record.promotion_type == PromotionType::HappyHour && time_slots.is_empty() {
            return Err(ValidationError::Required {
                field: "conditions.timeSlots".to_string(),
            });
        }

        Ok(Promotion {
            id: record.id,
            name: record.name,
            promotion_type: record.promotion_type,
            is_active: record.is_active,
            start_date: record.start_date,
            end_date: record.end_date,
            discount,
            conditions: PromotionConditions {
                min_order_amount: record.conditions.min_order_amount,
                time_slots,
            },
        })
    }
}

// =============================================================================
// Promotion Catalog
// =============================================================================

/// Validated promotions, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionCatalog {
    promotions: Vec<Promotion>,
}

impl PromotionCatalog {
    /// Validates provider records; bad records are reported, not fatal.
    pub fn ingest(records: Vec<PromotionRecord>) -> (Self, Vec<RejectedRecord>) {
        let mut promotions = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();

        for record in records {
            let id = record.id.clone();
            match Promotion::try_from(record) {
                Ok(promotion) => promotions.push(promotion),
                Err(error) => rejected.push(RejectedRecord { id, error }),
            }
        }

        (PromotionCatalog { promotions }, rejected)
    }

    pub fn get(&self, id: &str) -> Option<&Promotion> {
        self.promotions.iter().find(|p| p.id == id)
    }

    pub fn as_slice(&self) -> &[Promotion] {
        &self.promotions
    }

    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }
}

impl From<Vec<Promotion>> for PromotionCatalog {
    fn from(promotions: Vec<Promotion>) -> Self {
        PromotionCatalog { promotions }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
