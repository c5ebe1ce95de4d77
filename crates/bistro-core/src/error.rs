//! # Error Types
//!
//! Domain-specific error types for bistro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bistro-core errors (this file)                                        │
//! │  ├── CoreError        - Rejected cart/promotion operations             │
//! │  └── ValidationError  - Input and ingestion failures                   │
//! │                                                                         │
//! │  bistro-session errors (separate crate)                                │
//! │  ├── SessionError     - Fetch, config, submission failures             │
//! │  └── ViewError        - What the view layer sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SessionError → ViewError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error here is a rejected operation, never a crash: the cart is left
//! exactly as it was before the call.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and promotion errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The dish needs a size variant and none was given, or the given one is
    /// not an active variant of this dish.
    #[error("Invalid size variant for dish {dish_id}: {reason}")]
    InvalidVariant { dish_id: String, reason: String },

    /// A selected topping is switched off in the catalog.
    ///
    /// ## When This Occurs
    /// - The kitchen ran out after the topping was shown
    /// - A topping change on an existing line re-resolves against the new
    ///   catalog snapshot
    #[error("Topping {name} ({topping_id}) is not available")]
    UnavailableTopping { topping_id: String, name: String },

    /// The promotion's minimum order amount is not reached.
    ///
    /// ## User Workflow
    /// ```text
    /// Apply "SPEND200" (min 200,000)
    ///      │
    ///      ▼
    /// Subtotal: 150,000
    ///      │
    ///      ▼
    /// MinimumOrderNotMet { required: 200000, subtotal: 150000 }
    ///      │
    ///      ▼
    /// UI: "Add 50,000 more to use this promotion"
    /// ```
    #[error("Minimum order of {required} not met (subtotal {subtotal})")]
    MinimumOrderNotMet { required: Money, subtotal: Money },

    /// The applied promotion left its validity window or time slot between
    /// selection and checkout.
    #[error("Promotion {promotion_id} is no longer valid")]
    PromotionExpired { promotion_id: String },

    /// The promotion cannot be selected right now.
    #[error("Promotion {promotion_id} is not eligible: {reason}")]
    PromotionNotEligible { promotion_id: String, reason: String },

    #[error("Dish not found: {0}")]
    DishNotFound(String),

    #[error("Topping not found: {0}")]
    ToppingNotFound(String),

    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// The dish's availability flag is off.
    #[error("Dish {0} is not available")]
    DishUnavailable(String),

    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Quantity below 1 on a direct set. Removal is a separate operation.
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: u32, max: u32 },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while ingesting catalog/promotion records and while checking
/// cart input (notes, quantities) before business logic runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed HH:MM, reversed window).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// More than one mutually exclusive field is populated, or none is.
    #[error("{field} is ambiguous: {reason}")]
    Ambiguous { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::MinimumOrderNotMet {
            required: Money::from_minor(200_000),
            subtotal: Money::from_minor(150_000),
        };
        assert_eq!(
            err.to_string(),
            "Minimum order of 200000 not met (subtotal 150000)"
        );

        let err = CoreError::UnavailableTopping {
            topping_id: "t-1".to_string(),
            name: "Cheese".to_string(),
        };
        assert_eq!(err.to_string(), "Topping Cheese (t-1) is not available");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "note".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "note must be at most 200 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
