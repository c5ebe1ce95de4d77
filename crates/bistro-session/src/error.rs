//! # Session Error Types
//!
//! `SessionError` for everything the session does, and `ViewError`, the
//! serializable form handed to the view layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Bistro POS                             │
//! │                                                                         │
//! │  View Layer                  Rust Session                               │
//! │  ──────────                  ────────────                               │
//! │                                                                         │
//! │  session.apply_promotion("hh")                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<T, SessionError>                                         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Catalog missing? ── SessionError::CatalogNotLoaded ──┐          │  │
//! │  │         │                                             │          │  │
//! │  │         ▼                                             ▼          │  │
//! │  │  Cart rule broken? ── CoreError::MinimumOrderNotMet ─ ViewError ─►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "PROMOTION_ERROR",                                           │
//! │    "message": "Minimum order of 200000 not met (subtotal 150000)" }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is recoverable: a failed operation leaves the cart and the
//! installed snapshots exactly as they were.

use bistro_core::CoreError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Everything that can go wrong in a session.
#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Cart Errors
    // =========================================================================
    /// A cart rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The cart was used before the first catalog refresh succeeded.
    #[error("Catalog not loaded yet")]
    CatalogNotLoaded,

    // =========================================================================
    // Boundary Errors
    // =========================================================================
    /// A catalog or promotion fetch failed. The previous snapshot stays.
    #[error("{provider} fetch failed: {message}")]
    ProviderFailed { provider: &'static str, message: String },

    /// The order submitter refused or failed.
    #[error("Order submission failed: {0}")]
    SubmissionFailed(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),
}

impl SessionError {
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        SessionError::ProviderFailed {
            provider,
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::ConfigLoadFailed(_)
                | SessionError::ConfigSaveFailed(_)
                | SessionError::InvalidConfig(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// View Error
// =============================================================================

/// Error as the view layer receives it.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Dish not found: d-42"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Dish, topping, promotion or line does not exist
    NotFound,

    /// Input failed a validation rule
    ValidationError,

    /// Cart rule rejected the change (sold out, full cart, bad size)
    CartError,

    /// Promotion could not be applied or kept
    PromotionError,

    /// Catalog has not been fetched yet
    NotReady,

    /// Catalog or promotion provider failed
    ProviderError,

    /// Order could not be submitted
    SubmissionError,

    /// Session configuration problem
    ConfigError,
}

impl ViewError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ViewError {
            code,
            message: message.into(),
        }
    }
}

/// Converts cart rule errors to view errors.
impl From<CoreError> for ViewError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::DishNotFound(_)
            | CoreError::ToppingNotFound(_)
            | CoreError::PromotionNotFound(_)
            | CoreError::LineNotFound(_) => ErrorCode::NotFound,

            CoreError::Validation(_) | CoreError::InvalidQuantity(_) | CoreError::QuantityTooLarge { .. } => {
                ErrorCode::ValidationError
            }

            CoreError::InvalidVariant { .. }
            | CoreError::UnavailableTopping { .. }
            | CoreError::DishUnavailable(_)
            | CoreError::CartTooLarge { .. }
            | CoreError::EmptyCart => ErrorCode::CartError,

            CoreError::MinimumOrderNotMet { .. }
            | CoreError::PromotionExpired { .. }
            | CoreError::PromotionNotEligible { .. } => ErrorCode::PromotionError,
        };
        ViewError::new(code, err.to_string())
    }
}

impl From<SessionError> for ViewError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Core(core) => core.into(),
            SessionError::CatalogNotLoaded => ViewError::new(ErrorCode::NotReady, err.to_string()),
            SessionError::ProviderFailed { .. } => {
                tracing::error!("Provider failed: {}", err);
                ViewError::new(ErrorCode::ProviderError, "Menu could not be refreshed")
            }
            SessionError::SubmissionFailed(_) => ViewError::new(ErrorCode::SubmissionError, err.to_string()),
            SessionError::ConfigLoadFailed(_)
            | SessionError::ConfigSaveFailed(_)
            | SessionError::InvalidConfig(_) => ViewError::new(ErrorCode::ConfigError, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::Money;

    #[test]
    fn test_core_errors_map_to_codes() {
        let err: ViewError = CoreError::DishNotFound("d-42".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ViewError = CoreError::MinimumOrderNotMet {
            required: Money::from_minor(200_000),
            subtotal: Money::from_minor(150_000),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PromotionError);

        let err: ViewError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[test]
    fn test_session_errors_map_to_codes() {
        let err: ViewError = SessionError::CatalogNotLoaded.into();
        assert_eq!(err.code, ErrorCode::NotReady);

        let err: ViewError = SessionError::provider("catalog", "timeout").into();
        assert_eq!(err.code, ErrorCode::ProviderError);
        assert!(!err.message.contains("timeout"));

        let err: ViewError = SessionError::Core(CoreError::LineNotFound("x".into())).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_view_error_serialization() {
        let err = ViewError::new(ErrorCode::ValidationError, "bad");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "bad");
    }

    #[test]
    fn test_config_error_category() {
        assert!(SessionError::InvalidConfig("x".into()).is_config_error());
        assert!(!SessionError::CatalogNotLoaded.is_config_error());
    }
}
