//! # Validation Module
//!
//! Input validation for cart operations and provider records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: View (TypeScript)                                            │
//! │  └── Immediate feedback (empty note, stepper bounds)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Ingestion (catalog/promotion records)                        │
//! │  └── THIS MODULE: reject malformed records once, at the boundary       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart operations                                              │
//! │  └── THIS MODULE: quantities, notes, cart size                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::validation::{validate_note, validate_quantity};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert_eq!(validate_note(Some("  no onions ")).unwrap().as_deref(), Some("no onions"));
//! ```

use chrono::NaiveTime;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_AMOUNT, MAX_CART_LINES, MAX_LINE_QUANTITY, MAX_NOTE_LENGTH, MAX_TOPPING_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates and normalizes a free-text line note.
///
/// ## Rules
/// - Surrounding whitespace is trimmed
/// - Empty (or absent) notes become `None`
/// - At most `MAX_NOTE_LENGTH` (200) characters
pub fn validate_note(note: Option<&str>) -> ValidationResult<Option<String>> {
    let note = match note.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(note) => note,
    };

    if note.chars().count() > MAX_NOTE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LENGTH,
        });
    }

    Ok(Some(note.to_string()))
}

/// Validates an entity id or display name coming from a provider.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Parses a local clock time in `HH:MM` form.
///
/// ## Example
/// ```rust
/// use bistro_core::validation::parse_clock_time;
///
/// assert!(parse_clock_time("slot.start", "17:00").is_ok());
/// assert!(parse_clock_time("slot.start", "5pm").is_err());
/// ```
pub fn parse_clock_time(field: &str, value: &str) -> ValidationResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("expected HH:MM, got '{}'", value),
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Dish modal: "Add to cart"                                              │
/// │                                                                         │
/// │  Quantity stepper: 2                                                    │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(2) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty == 0? → Error: "quantity must be positive"               │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       └── OK → resolve_line_price                                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY as i64,
        });
    }

    Ok(())
}

/// Validates the per-line quantity of one topping.
///
/// ## Rules
/// - Must not exceed MAX_TOPPING_QUANTITY (99)
/// - Zero is allowed here; zero-quantity selections are dropped before pricing
pub fn validate_topping_quantity(qty: u32) -> ValidationResult<()> {
    if qty > MAX_TOPPING_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "topping quantity".to_string(),
            min: 0,
            max: MAX_TOPPING_QUANTITY as i64,
        });
    }

    Ok(())
}

/// Validates a catalog or promotion amount.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free toppings, free-item happy hours)
/// - Must not exceed MAX_AMOUNT
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount.minor() > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line fits in the cart.
///
/// ## Rules
/// - Must not exceed MAX_CART_LINES (100)
pub fn validate_cart_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_note() {
        assert_eq!(validate_note(None).unwrap(), None);
        assert_eq!(validate_note(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_note(Some(" less ice ")).unwrap().as_deref(),
            Some("less ice")
        );
        assert!(validate_note(Some(&"a".repeat(MAX_NOTE_LENGTH))).is_ok());
        assert!(validate_note(Some(&"a".repeat(MAX_NOTE_LENGTH + 1))).is_err());
    }

    #[test]
    fn test_validate_note_counts_characters_not_bytes() {
        // 200 multi-byte characters are still 200 characters
        let note = "ă".repeat(MAX_NOTE_LENGTH);
        assert!(validate_note(Some(&note)).is_ok());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("price", Money::zero()).is_ok());
        assert!(validate_amount("price", Money::from_minor(45_000)).is_ok());
        assert!(validate_amount("price", Money::from_minor(-1)).is_err());
        assert!(validate_amount("price", Money::from_minor(MAX_AMOUNT)).is_ok());
        assert!(validate_amount("price", Money::from_minor(MAX_AMOUNT + 1)).is_err());
    }

    #[test]
    fn test_validate_topping_quantity() {
        assert!(validate_topping_quantity(0).is_ok());
        assert!(validate_topping_quantity(MAX_TOPPING_QUANTITY).is_ok());
        assert!(validate_topping_quantity(MAX_TOPPING_QUANTITY + 1).is_err());
        assert!(validate_topping_quantity(u32::MAX).is_err());
    }

    #[test]
    fn test_parse_clock_time() {
        assert_eq!(
            parse_clock_time("start", "09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert!(parse_clock_time("start", "24:00").is_err());
        assert!(parse_clock_time("start", "").is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES).is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Pho").is_ok());
        assert!(validate_required("name", "  ").is_err());
    }
}
