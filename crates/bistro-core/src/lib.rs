//! # bistro-core: Cart Composition & Discount Logic for Bistro POS
//!
//! Everything that decides what a customer pays lives here, as pure
//! functions over plain data. No I/O, no clock, no async.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    View Layer (storefront UI)                   │   │
//! │  │    Menu ──► Dish Modal ──► Cart Drawer ──► Checkout             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ mutations / CartView snapshots         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bistro-session (PosSession)                    │   │
//! │  │    providers, latest-wins snapshots, clock, config, logging     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐ │   │
//! │  │   │  pricing  │─►│   cart    │─►│  discount   │◄─│eligibility│ │   │
//! │  │   │ LinePrice │  │ CartStore │  │ CartTotals  │  │ filter   │ │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘ │   │
//! │  │   catalog • promotion • money • validation • checkout          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in minor units and basis-point percentages
//! - [`catalog`] - Dishes, size variants, toppings and catalog ingestion
//! - [`promotion`] - Promotions, the `Discount` sum type and ingestion
//! - [`pricing`] - Pricing Resolver and topping/quantity helpers
//! - [`cart`] - Cart Store
//! - [`eligibility`] - Promotion Eligibility Filter
//! - [`discount`] - Discount Engine and cart totals
//! - [`checkout`] - Order payload
//! - [`error`] / [`validation`] - Domain errors and input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_core::cart::{CartStore, LineSpec};
//! use bistro_core::catalog::Dish;
//! use bistro_core::money::Money;
//!
//! let dish = Dish {
//!     id: "d-1".into(),
//!     name: "Com Tam".into(),
//!     price: Money::from_minor(45_000),
//!     cost: Money::from_minor(15_000),
//!     is_available: true,
//!     has_size_variants: false,
//!     size_variants: vec![],
//! };
//!
//! let mut cart = CartStore::new();
//! cart.add_line(&dish, LineSpec::quantity(2)).unwrap();
//! assert_eq!(cart.totals().final_total, Money::from_minor(90_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod discount;
pub mod eligibility;
pub mod error;
pub mod money;
pub mod pricing;
pub mod promotion;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bistro_core::CartStore` instead of
// `use bistro_core::cart::CartStore`

pub use cart::{CartLine, CartStore, LineId, LineSpec, PaymentMethod};
pub use catalog::{CatalogRecord, CatalogSnapshot, Dish, RejectedRecord, SizeVariant, Topping};
pub use checkout::{OrderLine, OrderPayload};
pub use discount::{compute_discount, CartTotals, DiscountOutcome, PromotionStatus};
pub use eligibility::eligible_promotions;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percent};
pub use pricing::{resolve_line_price, LinePrice, ToppingSelection};
pub use promotion::{Discount, Promotion, PromotionCatalog, PromotionRecord, PromotionType};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum characters in a line's kitchen note.
pub const MAX_NOTE_LENGTH: usize = 200;

/// Maximum quantity of a single cart line
///
/// ## Business Reason
/// Catches a mistyped quantity (1000 instead of 10) before it reaches the
/// kitchen.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Maximum units of one topping on a single cart line.
pub const MAX_TOPPING_QUANTITY: u32 = 99;

/// Maximum lines in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Largest amount, in minor units, accepted for a catalog price or a line
/// total. A full cart of such lines still fits comfortably in an `i64`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;
