//! # Catalog Types
//!
//! Dishes, size variants and toppings as handed over by the catalog provider.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Snapshot                                │
//! │                                                                         │
//! │  ┌─────────────────────┐          ┌─────────────────────────────┐      │
//! │  │        Dish         │          │       ToppingCatalog        │      │
//! │  │  ─────────────────  │          │  ─────────────────────────  │      │
//! │  │  _id, name          │          │  "Cheese":  [Mozzarella, …] │      │
//! │  │  price, cost        │          │  "Sauces":  [Chili, …]      │      │
//! │  │  isAvailable        │          │                             │      │
//! │  │  sizeVariants[] ────┼──┐       │  category = grouping only,  │      │
//! │  └─────────────────────┘  │       │  never priced               │      │
//! │                           ▼       └─────────────────────────────┘      │
//! │                 ┌─────────────────┐                                     │
//! │                 │  SizeVariant    │                                     │
//! │                 │  size, price,   │                                     │
//! │                 │  cost, isDefault│                                     │
//! │                 └─────────────────┘                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The wire structs double as domain types: ingestion only validates them
//! and drops the ones that break the catalog rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_amount, validate_required};

fn default_true() -> bool {
    true
}

// =============================================================================
// Size Variant
// =============================================================================

/// A named price/cost override for a dish ("Small", "Large").
///
/// The size label is the variant's identity within its dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SizeVariant {
    pub size: String,
    pub price: Money,
    #[serde(default)]
    pub cost: Money,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

// =============================================================================
// Dish
// =============================================================================

/// A menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Dish {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Price used when the dish has no size variants.
    pub price: Money,
    #[serde(default)]
    pub cost: Money,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub has_size_variants: bool,
    /// Ordered as the kitchen lists them. Only meaningful when
    /// `has_size_variants` is set.
    #[serde(default)]
    pub size_variants: Vec<SizeVariant>,
}

impl Dish {
    /// Active variants, in catalog order.
    pub fn active_variants(&self) -> impl Iterator<Item = &SizeVariant> {
        self.size_variants.iter().filter(|v| v.is_active)
    }

    /// Looks up an active variant by size label.
    pub fn variant(&self, size: &str) -> Option<&SizeVariant> {
        self.active_variants().find(|v| v.size == size)
    }

    /// Checks the catalog rules for a single dish.
    ///
    /// ## Rules
    /// - id and name are present
    /// - price and cost are non-negative, for the dish and every variant
    /// - `has_size_variants` implies at least one active variant
    /// - at most one active variant is flagged default
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required("dish._id", &self.id)?;
        validate_required("dish.name", &self.name)?;
        validate_amount("dish.price", self.price)?;
        validate_amount("dish.cost", self.cost)?;

        for variant in &self.size_variants {
            validate_required("sizeVariant.size", &variant.size)?;
            validate_amount("sizeVariant.price", variant.price)?;
            validate_amount("sizeVariant.cost", variant.cost)?;
        }

        if self.has_size_variants && self.active_variants().next().is_none() {
            return Err(ValidationError::Required {
                field: "sizeVariants".to_string(),
            });
        }

        if self.active_variants().filter(|v| v.is_default).count() > 1 {
            return Err(ValidationError::Ambiguous {
                field: "sizeVariants".to_string(),
                reason: "more than one active variant is flagged default".to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Topping
// =============================================================================

/// An add-on priced per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Topping {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    /// Category the topping was grouped under. Filled in during ingestion.
    #[serde(default)]
    pub category: String,
}

impl Topping {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_required("topping._id", &self.id)?;
        validate_required("topping.name", &self.name)?;
        validate_amount("topping.price", self.price)
    }
}

/// Toppings flattened from the provider's `{category: [topping]}` grouping.
///
/// Categories come out in name order (the wire object carries no order of
/// its own); toppings keep their order within a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToppingCatalog {
    toppings: Vec<Topping>,
}

impl ToppingCatalog {
    /// Looks up a topping by id.
    pub fn get(&self, id: &str) -> Option<&Topping> {
        self.toppings.iter().find(|t| t.id == id)
    }

    /// All toppings, grouped category by category.
    pub fn iter(&self) -> impl Iterator<Item = &Topping> {
        self.toppings.iter()
    }

    /// Toppings of one category.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Topping> {
        self.toppings.iter().filter(move |t| t.category == category)
    }

    /// Category names, in display order.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for topping in &self.toppings {
            if names.last() != Some(&topping.category.as_str()) {
                names.push(&topping.category);
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.toppings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toppings.is_empty()
    }
}

// =============================================================================
// Wire Record & Snapshot
// =============================================================================

/// What the catalog provider returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    #[serde(default)]
    pub dishes: Vec<Dish>,
    #[serde(default)]
    pub toppings: BTreeMap<String, Vec<Topping>>,
}

/// A provider record that failed ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub id: String,
    pub error: ValidationError,
}

/// Validated, read-only catalog the cart prices against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    dishes: Vec<Dish>,
    toppings: ToppingCatalog,
}

impl CatalogSnapshot {
    /// Validates a provider record.
    ///
    /// Invalid dishes and toppings are left out and reported; the rest of the
    /// catalog stays usable.
    pub fn ingest(record: CatalogRecord) -> (Self, Vec<RejectedRecord>) {
        let mut rejected = Vec::new();

        let mut dishes = Vec::with_capacity(record.dishes.len());
        for dish in record.dishes {
            match dish.validate() {
                Ok(()) => dishes.push(dish),
                Err(error) => rejected.push(RejectedRecord { id: dish.id, error }),
            }
        }

        let mut toppings = Vec::new();
        for (category, group) in record.toppings {
            for mut topping in group {
                topping.category = category.clone();
                match topping.validate() {
                    Ok(()) => toppings.push(topping),
                    Err(error) => rejected.push(RejectedRecord {
                        id: topping.id,
                        error,
                    }),
                }
            }
        }

        let snapshot = CatalogSnapshot {
            dishes,
            toppings: ToppingCatalog { toppings },
        };
        (snapshot, rejected)
    }

    /// Looks up a dish by id.
    pub fn dish(&self, id: &str) -> Option<&Dish> {
        self.dishes.iter().find(|d| d.id == id)
    }

    /// Looks up a topping by id.
    pub fn topping(&self, id: &str) -> Option<&Topping> {
        self.toppings.get(id)
    }

    pub fn dishes(&self) -> &[Dish] {
        &self.dishes
    }

    pub fn toppings(&self) -> &ToppingCatalog {
        &self.toppings
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn variant(size: &str, price: i64, is_default: bool) -> SizeVariant {
        SizeVariant {
            size: size.to_string(),
            price: Money::from_minor(price),
            cost: Money::zero(),
            is_default,
            is_active: true,
        }
    }

    fn dish_with_variants(variants: Vec<SizeVariant>) -> Dish {
        Dish {
            id: "d-1".to_string(),
            name: "Milk Tea".to_string(),
            price: Money::from_minor(30_000),
            cost: Money::from_minor(10_000),
            is_available: true,
            has_size_variants: true,
            size_variants: variants,
        }
    }

    #[test]
    fn test_deserialize_provider_shape() {
        let record: CatalogRecord = serde_json::from_value(json!({
            "dishes": [{
                "_id": "d-1",
                "name": "Milk Tea",
                "price": 30000,
                "cost": 10000,
                "isAvailable": true,
                "hasSizeVariants": true,
                "sizeVariants": [
                    {"size": "M", "price": 30000, "cost": 10000, "isDefault": true},
                    {"size": "L", "price": 38000, "cost": 12000}
                ]
            }],
            "toppings": {
                "Jelly": [{"_id": "t-2", "name": "Coconut Jelly", "price": 5000, "isAvailable": true}],
                "Boba": [{"_id": "t-1", "name": "Pearl", "price": 7000, "description": "Black tapioca", "isAvailable": true}]
            }
        }))
        .unwrap();

        let (snapshot, rejected) = CatalogSnapshot::ingest(record);
        assert!(rejected.is_empty());

        let dish = snapshot.dish("d-1").unwrap();
        assert_eq!(dish.size_variants.len(), 2);
        assert!(dish.size_variants[1].is_active);

        assert_eq!(snapshot.toppings().categories(), vec!["Boba", "Jelly"]);
        assert_eq!(snapshot.topping("t-2").unwrap().category, "Jelly");
        assert_eq!(snapshot.toppings().in_category("Boba").count(), 1);
    }

    #[test]
    fn test_variant_lookup_skips_inactive() {
        let mut large = variant("L", 38_000, false);
        large.is_active = false;
        let dish = dish_with_variants(vec![variant("M", 30_000, true), large]);

        assert!(dish.variant("M").is_some());
        assert!(dish.variant("L").is_none());
        assert!(dish.variant("XL").is_none());
    }

    #[test]
    fn test_validate_requires_variants_when_flagged() {
        let dish = dish_with_variants(Vec::new());
        assert!(matches!(
            dish.validate(),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_two_defaults() {
        let dish = dish_with_variants(vec![variant("M", 30_000, true), variant("L", 38_000, true)]);
        assert!(matches!(
            dish.validate(),
            Err(ValidationError::Ambiguous { .. })
        ));
    }

    #[test]
    fn test_validate_ignores_inactive_second_default() {
        let mut retired = variant("L", 38_000, true);
        retired.is_active = false;
        let dish = dish_with_variants(vec![variant("M", 30_000, true), retired]);
        assert!(dish.validate().is_ok());
    }

    #[test]
    fn test_ingest_drops_invalid_records_only() {
        let mut bad = dish_with_variants(vec![variant("M", -1, true)]);
        bad.id = "d-bad".to_string();
        let good = dish_with_variants(vec![variant("M", 30_000, true)]);

        let mut toppings = BTreeMap::new();
        toppings.insert(
            "Sauces".to_string(),
            vec![Topping {
                id: "t-1".to_string(),
                name: String::new(),
                price: Money::from_minor(1_000),
                description: None,
                is_available: true,
                category: String::new(),
            }],
        );

        let (snapshot, rejected) = CatalogSnapshot::ingest(CatalogRecord {
            dishes: vec![bad, good],
            toppings,
        });

        assert_eq!(snapshot.dishes().len(), 1);
        assert!(snapshot.toppings().is_empty());
        let ids: Vec<&str> = rejected.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["d-bad", "t-1"]);
    }
}
