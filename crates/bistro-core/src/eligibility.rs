//! # Promotion Eligibility
//!
//! Decides which promotions the cart may offer at a given instant.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  eligible(p, now) =                                                     │
//! │        p.is_active                                                      │
//! │    AND p.start_date <= now <= p.end_date                                │
//! │    AND p.type ∈ {order_percentage, order_fixed, happy_hour}             │
//! │    AND (p.type != happy_hour                                            │
//! │         OR ∃ slot: slot.start <= local_time(now) < slot.end)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `now` carries its own UTC offset: the validity window is compared as an
//! instant, the time slots against the wall clock at that offset.

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{CoreError, CoreResult};
use crate::promotion::{Promotion, PromotionType};

/// Why a promotion is not selectable, for messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    Inactive,
    NotStarted,
    Ended,
    NotOrderLevel,
    OutsideTimeSlot,
}

impl Ineligibility {
    pub fn describe(&self) -> &'static str {
        match self {
            Ineligibility::Inactive => "promotion is switched off",
            Ineligibility::NotStarted => "promotion has not started yet",
            Ineligibility::Ended => "promotion has ended",
            Ineligibility::NotOrderLevel => "promotion does not apply to whole orders",
            Ineligibility::OutsideTimeSlot => "outside happy hour",
        }
    }
}

/// Checks one promotion, reporting the first rule it breaks.
pub fn check_eligibility(promotion: &Promotion, now: &DateTime<FixedOffset>) -> Result<(), Ineligibility> {
    if !promotion.is_active {
        return Err(Ineligibility::Inactive);
    }

    let instant = now.with_timezone(&Utc);
    if instant < promotion.start_date {
        return Err(Ineligibility::NotStarted);
    }
    if instant > promotion.end_date {
        return Err(Ineligibility::Ended);
    }

    if !promotion.promotion_type.is_order_level() {
        return Err(Ineligibility::NotOrderLevel);
    }

    if promotion.promotion_type == PromotionType::HappyHour && !promotion.slot_contains(now.time()) {
        return Err(Ineligibility::OutsideTimeSlot);
    }

    Ok(())
}

/// Whether a promotion is selectable at `now`.
pub fn is_eligible(promotion: &Promotion, now: &DateTime<FixedOffset>) -> bool {
    check_eligibility(promotion, now).is_ok()
}

/// The promotions selectable at `now`, in catalog order.
///
/// Advisory: the list is for display and never changes the catalog. An empty
/// catalog or a quiet hour yields an empty list.
pub fn eligible_promotions<'a>(
    catalog: &'a [Promotion],
    now: &DateTime<FixedOffset>,
) -> Vec<&'a Promotion> {
    catalog.iter().filter(|p| is_eligible(p, now)).collect()
}

/// Selection-time check: rejects with `PromotionNotEligible`.
pub fn ensure_selectable(promotion: &Promotion, now: &DateTime<FixedOffset>) -> CoreResult<()> {
    check_eligibility(promotion, now).map_err(|why| CoreError::PromotionNotEligible {
        promotion_id: promotion.id.clone(),
        reason: why.describe().to_string(),
    })
}

/// Checkout-time re-check: a promotion that was fine when chosen may have
/// lapsed since. Rejects with `PromotionExpired`.
pub fn ensure_still_eligible(promotion: &Promotion, now: &DateTime<FixedOffset>) -> CoreResult<()> {
    check_eligibility(promotion, now).map_err(|_| CoreError::PromotionExpired {
        promotion_id: promotion.id.clone(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Money, Percent};
    use crate::promotion::{Discount, PromotionConditions, TimeSlot};
    use chrono::{NaiveTime, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        // UTC+7, a restaurant in Ho Chi Minh City
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 6, 15, hour, minute, 0)
            .unwrap()
    }

    fn promotion(id: &str, promotion_type: PromotionType) -> Promotion {
        Promotion {
            id: id.to_string(),
            name: id.to_uppercase(),
            promotion_type,
            is_active: true,
            start_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap(),
            discount: Discount::Percentage(Percent::from_bps(1_000)),
            conditions: PromotionConditions::default(),
        }
    }

    fn happy_hour() -> Promotion {
        let mut promo = promotion("hh", PromotionType::HappyHour);
        promo.conditions.time_slots = vec![TimeSlot::new(
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        )
        .unwrap()];
        promo
    }

    #[test]
    fn test_happy_hour_boundaries() {
        let promo = happy_hour();
        assert!(is_eligible(&promo, &at(18, 59)));
        assert!(is_eligible(&promo, &at(17, 0)));
        assert!(!is_eligible(&promo, &at(19, 0)));
        assert!(!is_eligible(&promo, &at(16, 59)));
    }

    #[test]
    fn test_happy_hour_uses_local_clock() {
        let promo = happy_hour();
        // 11:30 UTC is 18:30 in UTC+7
        let utc_evening = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 6, 15, 11, 30, 0)
            .unwrap();
        assert!(!is_eligible(&promo, &utc_evening));
        assert!(is_eligible(&promo, &utc_evening.with_timezone(&FixedOffset::east_opt(7 * 3600).unwrap())));
    }

    #[test]
    fn test_never_returns_inactive_expired_or_future() {
        let mut inactive = promotion("inactive", PromotionType::OrderFixed);
        inactive.is_active = false;

        let mut expired = promotion("expired", PromotionType::OrderFixed);
        expired.end_date = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

        let mut future = promotion("future", PromotionType::OrderFixed);
        future.start_date = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();

        let live = promotion("live", PromotionType::OrderPercentage);
        let item_level = promotion("item", PromotionType::ItemPercentage);
        let other = promotion("other", PromotionType::Other);

        let catalog = vec![inactive, expired, live, future, item_level, other];
        let eligible = eligible_promotions(&catalog, &at(12, 0));

        let ids: Vec<&str> = eligible.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["live"]);
    }

    #[test]
    fn test_window_is_inclusive() {
        let mut promo = promotion("edge", PromotionType::OrderFixed);
        let now = at(12, 0);
        promo.start_date = now.with_timezone(&Utc);
        promo.end_date = now.with_timezone(&Utc);
        assert!(is_eligible(&promo, &now));
    }

    #[test]
    fn test_keeps_catalog_order() {
        let catalog = vec![
            promotion("b", PromotionType::OrderFixed),
            promotion("a", PromotionType::OrderPercentage),
            happy_hour(),
        ];
        let ids: Vec<&str> = eligible_promotions(&catalog, &at(18, 0))
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a", "hh"]);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(eligible_promotions(&[], &at(12, 0)).is_empty());
    }

    #[test]
    fn test_error_kinds() {
        let promo = happy_hour();
        assert!(matches!(
            ensure_selectable(&promo, &at(9, 0)),
            Err(CoreError::PromotionNotEligible { .. })
        ));
        assert!(matches!(
            ensure_still_eligible(&promo, &at(19, 0)),
            Err(CoreError::PromotionExpired { .. })
        ));
        assert!(ensure_still_eligible(&promo, &at(18, 0)).is_ok());
    }

    #[test]
    fn test_describe_reason() {
        let mut promo = promotion("x", PromotionType::OrderFixed);
        promo.discount = Discount::FixedAmount(Money::from_minor(5_000));
        promo.is_active = false;
        assert_eq!(check_eligibility(&promo, &at(12, 0)), Err(Ineligibility::Inactive));
    }
}
