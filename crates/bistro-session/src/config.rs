//! # Session Configuration
//!
//! Store settings the session needs: the store's clock offset, the payment
//! method a fresh cart starts with, and how amounts are displayed.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BISTRO_STORE_NAME="Pho 24"                                         │
//! │     BISTRO_UTC_OFFSET_MINUTES=420                                      │
//! │     BISTRO_PAYMENT_METHOD=card                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/session.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.bistro.pos/session.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     host offset, cash, "₫" with 0 decimals                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # session.toml
//! [store]
//! name = "Pho 24 - District 1"
//! utc_offset_minutes = 420  # omit to use the host's offset
//!
//! [cart]
//! default_payment_method = "cash"  # cash | card | bank_transfer | e_wallet
//!
//! [display]
//! currency_symbol = "₫"
//! currency_decimals = 0
//! ```

use std::path::{Path, PathBuf};

use bistro_core::{Money, PaymentMethod};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};

/// Largest offset chrono accepts, in minutes (±18h).
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// More decimals than any real currency uses.
const MAX_CURRENCY_DECIMALS: u8 = 4;

// =============================================================================
// Store Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Offset of the store's wall clock from UTC. Happy-hour slots are read
    /// against this clock.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

fn default_store_name() -> String {
    "Bistro".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            utc_offset_minutes: None,
        }
    }
}

// =============================================================================
// Cart Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSettings {
    /// Payment method of a new or cleared cart.
    #[serde(default)]
    pub default_payment_method: PaymentMethod,
}

// =============================================================================
// Display Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Minor units per major unit, as a power of ten.
    #[serde(default)]
    pub currency_decimals: u8,
}

fn default_currency_symbol() -> String {
    "₫".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
            currency_decimals: 0,
        }
    }
}

// =============================================================================
// Main Session Configuration
// =============================================================================

/// Complete session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub cart: CartSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl SessionConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (session.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading session config from file");
                config = Self::read_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load session config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Session config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(SessionError::InvalidConfig("store.name must not be empty".into()));
        }

        if let Some(minutes) = self.store.utc_offset_minutes {
            if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
                return Err(SessionError::InvalidConfig(format!(
                    "store.utc_offset_minutes must be within ±{}, got {}",
                    MAX_OFFSET_MINUTES, minutes
                )));
            }
        }

        if self.display.currency_decimals > MAX_CURRENCY_DECIMALS {
            return Err(SessionError::InvalidConfig(format!(
                "display.currency_decimals must be at most {}, got {}",
                MAX_CURRENCY_DECIMALS, self.display.currency_decimals
            )));
        }

        Ok(())
    }

    fn read_file(path: &Path) -> SessionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var("BISTRO_STORE_NAME") {
            debug!(name = %name, "Overriding store name from environment");
            self.store.name = name;
        }

        if let Ok(offset) = std::env::var("BISTRO_UTC_OFFSET_MINUTES") {
            match offset.trim().parse::<i32>() {
                Ok(minutes) => {
                    debug!(minutes, "Overriding UTC offset from environment");
                    self.store.utc_offset_minutes = Some(minutes);
                }
                Err(_) => warn!(offset = %offset, "Ignoring unparseable BISTRO_UTC_OFFSET_MINUTES"),
            }
        }

        if let Ok(method) = std::env::var("BISTRO_PAYMENT_METHOD") {
            match method.parse() {
                Ok(parsed) => {
                    debug!(method = %method, "Overriding default payment method from environment");
                    self.cart.default_payment_method = parsed;
                }
                Err(_) => warn!(method = %method, "Unknown payment method in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bistro", "pos")
            .map(|dirs| dirs.config_dir().join("session.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The configured store offset, if any. `None` means the host's offset.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.store
            .utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
    }

    pub fn default_payment_method(&self) -> PaymentMethod {
        self.cart.default_payment_method
    }

    /// Formats an amount for display.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::Money;
    /// use bistro_session::config::SessionConfig;
    ///
    /// let config = SessionConfig::default();
    /// assert_eq!(config.format_amount(Money::from_minor(125_000)), "125,000₫");
    /// ```
    pub fn format_amount(&self, amount: Money) -> String {
        let minor = amount.minor();
        let decimals = self.display.currency_decimals as u32;
        let divisor = 10_i64.pow(decimals);
        let whole = group_thousands((minor / divisor).unsigned_abs());
        let frac = (minor % divisor).abs();

        format!(
            "{}{}{}",
            if minor < 0 { "-" } else { "" },
            if decimals > 0 {
                format!("{}.{:0width$}", whole, frac, width = decimals as usize)
            } else {
                whole
            },
            self.display.currency_symbol
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.store.name, "Bistro");
        assert_eq!(config.default_payment_method(), PaymentMethod::Cash);
        assert!(config.utc_offset().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file() {
        let config: SessionConfig = toml::from_str(
            r#"
            [store]
            utc_offset_minutes = 420

            [cart]
            default_payment_method = "e_wallet"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Bistro");
        assert_eq!(config.utc_offset(), FixedOffset::east_opt(7 * 3600));
        assert_eq!(config.default_payment_method(), PaymentMethod::EWallet);
        assert_eq!(config.display.currency_symbol, "₫");
    }

    #[test]
    fn test_config_validation() {
        let mut config = SessionConfig::default();

        config.store.utc_offset_minutes = Some(19 * 60);
        assert!(config.validate().is_err());

        config.store.utc_offset_minutes = Some(-18 * 60);
        assert!(config.validate().is_ok());

        config.display.currency_decimals = 5;
        assert!(config.validate().is_err());

        config.display.currency_decimals = 2;
        config.store.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.toml");

        let mut config = SessionConfig::default();
        config.store.name = "Banh Mi Corner".to_string();
        config.cart.default_payment_method = PaymentMethod::Card;
        config.save(Some(path.clone())).unwrap();

        let loaded = SessionConfig::read_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "[display]\ncurrency_decimals = 9\n").unwrap();

        let err = SessionConfig::load(Some(path.clone())).unwrap_err();
        assert!(err.is_config_error());

        // falls back instead of failing
        assert_eq!(SessionConfig::load_or_default(Some(path)).display.currency_decimals, 0);
    }

    #[test]
    fn test_format_amount() {
        let config = SessionConfig::default();
        assert_eq!(config.format_amount(Money::from_minor(0)), "0₫");
        assert_eq!(config.format_amount(Money::from_minor(999)), "999₫");
        assert_eq!(config.format_amount(Money::from_minor(1_250_000)), "1,250,000₫");
        assert_eq!(config.format_amount(Money::from_minor(-20_000)), "-20,000₫");

        let mut dollars = SessionConfig::default();
        dollars.display.currency_symbol = " USD".to_string();
        dollars.display.currency_decimals = 2;
        assert_eq!(dollars.format_amount(Money::from_minor(123_456)), "1,234.56 USD");
        assert_eq!(dollars.format_amount(Money::from_minor(5)), "0.05 USD");
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&SessionConfig::default()).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[cart]"));
        assert!(toml_str.contains("default_payment_method = \"cash\""));
    }
}
