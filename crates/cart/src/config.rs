//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults are the canonical storefront policy.
//!
//! - `CART_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is free (default: 4000)
//! - `CART_FLAT_SHIPPING_FEE` - Shipping fee charged otherwise (default: 199)
//! - `CART_TAX_RATE` - Tax rate as a fraction, 0..=1 (default: 0.18)
//! - `CART_CURRENCY` - ISO 4217 currency code (default: INR)
//! - `CART_QUANTITY_UPDATE_LATENCY_MS` - Simulated quantity update round trip (default: 300)
//! - `CART_REMOVAL_LATENCY_MS` - Simulated removal round trip (default: 500)
//! - `CART_ORDER_LATENCY_MS` - Simulated order placement round trip (default: 3000)

use std::time::Duration;

use ecofinds_core::CurrencyCode;
use rust_decimal::Decimal;
use thiserror::Error;

const DEFAULT_FREE_SHIPPING_THRESHOLD: &str = "4000";
const DEFAULT_FLAT_SHIPPING_FEE: &str = "199";
const DEFAULT_TAX_RATE: &str = "0.18";
const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_QUANTITY_UPDATE_LATENCY_MS: &str = "300";
const DEFAULT_REMOVAL_LATENCY_MS: &str = "500";
const DEFAULT_ORDER_LATENCY_MS: &str = "3000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Complete cart configuration.
#[derive(Debug, Clone, Default)]
pub struct CartConfig {
    /// Shipping and tax policy
    pub pricing: PricingConfig,
    /// Simulated backend round trips
    pub latency: LatencyConfig,
}

/// Shipping and tax policy applied to every cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    /// Shipping is waived when the subtotal is strictly above this amount
    pub free_shipping_threshold: Decimal,
    /// Flat fee charged when shipping is not waived
    pub flat_shipping_fee: Decimal,
    /// Tax rate applied to the subtotal (0.18 = 18%)
    pub tax_rate: Decimal,
    /// Currency all amounts are expressed in
    pub currency: CurrencyCode,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::from(4000),
            flat_shipping_fee: Decimal::from(199),
            tax_rate: Decimal::new(18, 2),
            currency: CurrencyCode::INR,
        }
    }
}

/// Latency windows of the simulated backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyConfig {
    /// Round trip for a quantity change
    pub quantity_update: Duration,
    /// Round trip for a line removal
    pub removal: Duration,
    /// Round trip for placing an order
    pub order_placement: Duration,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            quantity_update: Duration::from_millis(300),
            removal: Duration::from_millis(500),
            order_placement: Duration::from_millis(3000),
        }
    }
}

impl LatencyConfig {
    /// No latency at all, for tests and scripted runs.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            quantity_update: Duration::ZERO,
            removal: Duration::ZERO,
            order_placement: Duration::ZERO,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed or
    /// is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed or is out of range.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pricing = PricingConfig {
            free_shipping_threshold: get_amount(
                &lookup,
                "CART_FREE_SHIPPING_THRESHOLD",
                DEFAULT_FREE_SHIPPING_THRESHOLD,
            )?,
            flat_shipping_fee: get_amount(
                &lookup,
                "CART_FLAT_SHIPPING_FEE",
                DEFAULT_FLAT_SHIPPING_FEE,
            )?,
            tax_rate: get_tax_rate(&lookup, "CART_TAX_RATE")?,
            currency: get_or_default(&lookup, "CART_CURRENCY", DEFAULT_CURRENCY)
                .parse::<CurrencyCode>()
                .map_err(|e| ConfigError::InvalidEnvVar("CART_CURRENCY".to_string(), e.to_string()))?,
        };

        let latency = LatencyConfig {
            quantity_update: get_millis(
                &lookup,
                "CART_QUANTITY_UPDATE_LATENCY_MS",
                DEFAULT_QUANTITY_UPDATE_LATENCY_MS,
            )?,
            removal: get_millis(&lookup, "CART_REMOVAL_LATENCY_MS", DEFAULT_REMOVAL_LATENCY_MS)?,
            order_placement: get_millis(
                &lookup,
                "CART_ORDER_LATENCY_MS",
                DEFAULT_ORDER_LATENCY_MS,
            )?,
        };

        Ok(Self { pricing, latency })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a value with a default.
fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Parse a non-negative currency amount.
fn get_amount<F>(lookup: &F, key: &str, default: &str) -> Result<Decimal, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = get_or_default(lookup, key, default)
        .trim()
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if value < Decimal::ZERO {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must not be negative (got {value})"),
        ));
    }
    Ok(value)
}

/// Parse a tax rate expressed as a fraction between 0 and 1.
fn get_tax_rate<F>(lookup: &F, key: &str) -> Result<Decimal, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let rate = get_amount(lookup, key, DEFAULT_TAX_RATE)?;
    if rate > Decimal::ONE {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be a fraction between 0 and 1 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Parse a latency in milliseconds.
fn get_millis<F>(lookup: &F, key: &str, default: &str) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    get_or_default(lookup, key, default)
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
