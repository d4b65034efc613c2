//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `FOOD_CART_API_URL` - REST backend base URL (default: `http://localhost:8080`)
//! - `FOOD_CART_DATA_DIR` - Directory for the cart and session store (default: `.food-cart`)
//! - `FOOD_CART_SHIPPING_COST` - Fixed shipping cost added to every order (default: 500)
//! - `FOOD_CART_HTTP_TIMEOUT_SECS` - Request timeout for backend calls (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use food_cart_core::Price;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_DATA_DIR: &str = ".food-cart";
const DEFAULT_SHIPPING_COST: &str = "500";
const DEFAULT_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend
    pub api_url: Url,
    /// Directory holding the persisted cart and session
    pub data_dir: PathBuf,
    /// Fixed shipping cost added to every order total
    pub shipping_cost: Price,
    /// Timeout applied to every backend request
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value or
    /// the shipping cost is negative.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_url = Url::parse(&get("FOOD_CART_API_URL", DEFAULT_API_URL))
            .map_err(|e| invalid("FOOD_CART_API_URL", e))?;
        if api_url.cannot_be_a_base() {
            return Err(invalid("FOOD_CART_API_URL", "must be an http(s) base URL"));
        }

        let data_dir = PathBuf::from(get("FOOD_CART_DATA_DIR", DEFAULT_DATA_DIR));

        let shipping_cost = get("FOOD_CART_SHIPPING_COST", DEFAULT_SHIPPING_COST)
            .parse::<Price>()
            .map_err(|e| invalid("FOOD_CART_SHIPPING_COST", e))?;
        if shipping_cost.is_negative() {
            return Err(invalid("FOOD_CART_SHIPPING_COST", "must not be negative"));
        }

        let timeout_secs = get("FOOD_CART_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| invalid("FOOD_CART_HTTP_TIMEOUT_SECS", e))?;

        Ok(Self {
            api_url,
            data_dir,
            shipping_cost,
            request_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.trim().is_empty()),
        })
    }
}

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.data_dir, PathBuf::from(".food-cart"));
        assert_eq!(config.shipping_cost, Price::from_cents(50_000));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("FOOD_CART_API_URL", "https://api.food.test/v1/"),
            ("FOOD_CART_SHIPPING_COST", "250.50"),
            ("FOOD_CART_HTTP_TIMEOUT_SECS", "3"),
            ("SENTRY_DSN", "https://key@sentry.test/1"),
        ])
        .unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.food.test/v1/");
        assert_eq!(config.shipping_cost, Price::from_cents(25_050));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(
            config.sentry_dsn.as_deref(),
            Some("https://key@sentry.test/1")
        );
    }

    #[test]
    fn test_rejects_negative_shipping() {
        let err = load(&[("FOOD_CART_SHIPPING_COST", "-1")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "FOOD_CART_SHIPPING_COST"));
    }

    #[test]
    fn test_rejects_bad_url_and_timeout() {
        assert!(load(&[("FOOD_CART_API_URL", "not a url")]).is_err());
        assert!(load(&[("FOOD_CART_API_URL", "mailto:chef@food.test")]).is_err());
        assert!(load(&[("FOOD_CART_HTTP_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn test_blank_sentry_dsn_is_ignored() {
        let config = load(&[("SENTRY_DSN", "  ")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
