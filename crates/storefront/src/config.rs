//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `SUNBLOOM_API_URL` - Backend base URL (catalog, identity, orders)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SUNBLOOM_PRODUCT_ID` - Catalog product sold here (default: 847694)
//! - `ORDER_DRAFT_TTL_HOURS` - Saved selection lifetime (default: 168)
//! - `AUTH_RECONCILE_INTERVAL_SECS` - Auth reconciliation period, min 1 (default: 30)
//! - `CHECKOUT_PHONE_PREFIX` - Forced phone prefix (default: +234)
//! - `CHECKOUT_CARD_VALIDATION` - `presence` or `strict` (default: presence)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use sunbloom_core::ProductId;
use thiserror::Error;
use url::Url;

use crate::checkout::{CardValidation, CheckoutPolicy};

const DEFAULT_PRODUCT_ID: &str = "847694";
const DEFAULT_DRAFT_TTL_HOURS: i64 = 168;
const DEFAULT_RECONCILE_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Backend API base URL
    pub api_url: Url,
    /// The product this storefront sells
    pub product_id: ProductId,
    /// How long a saved selection survives
    pub draft_ttl: TimeDelta,
    /// Period of the auth reconciliation task
    pub auth_reconcile_interval: Duration,
    /// Phone prefix and card validation policy
    pub checkout: CheckoutPolicy,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Configuration with every optional setting at its default.
    #[must_use]
    pub fn new(base_url: Url, api_url: Url) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url,
            api_url,
            product_id: ProductId::new(DEFAULT_PRODUCT_ID),
            draft_ttl: TimeDelta::hours(DEFAULT_DRAFT_TTL_HOURS),
            auth_reconcile_interval: Duration::from_secs(DEFAULT_RECONCILE_SECS),
            checkout: CheckoutPolicy::default(),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let base_url = env.parse_required::<Url>("STOREFRONT_BASE_URL")?;
        let api_url = env.parse_required::<Url>("SUNBLOOM_API_URL")?;
        let mut config = Self::new(base_url, api_url);

        if let Some(host) = env.parse::<IpAddr>("STOREFRONT_HOST")? {
            config.host = host;
        }
        if let Some(port) = env.parse::<u16>("STOREFRONT_PORT")? {
            config.port = port;
        }
        if let Some(product_id) = env.get("SUNBLOOM_PRODUCT_ID") {
            config.product_id = ProductId::new(product_id);
        }
        if let Some(hours) = env.parse::<u32>("ORDER_DRAFT_TTL_HOURS")? {
            if hours == 0 {
                return Err(invalid("ORDER_DRAFT_TTL_HOURS", "must be at least 1"));
            }
            config.draft_ttl = TimeDelta::hours(i64::from(hours));
        }
        if let Some(secs) = env.parse::<u64>("AUTH_RECONCILE_INTERVAL_SECS")? {
            if secs == 0 {
                return Err(invalid("AUTH_RECONCILE_INTERVAL_SECS", "must be at least 1"));
            }
            config.auth_reconcile_interval = Duration::from_secs(secs);
        }
        if let Some(prefix) = env.get("CHECKOUT_PHONE_PREFIX") {
            config.checkout.phone_prefix = prefix;
        }
        if let Some(policy) = env.parse::<CardValidation>("CHECKOUT_CARD_VALIDATION")? {
            config.checkout.card_validation = policy;
        }
        if let Some(format) = env.get("LOG_FORMAT") {
            config.json_logs = match format.trim().to_ascii_lowercase().as_str() {
                "json" => true,
                "text" => false,
                _ => return Err(invalid("LOG_FORMAT", "expected text or json")),
            };
        }
        config.sentry_dsn = env.get("SENTRY_DSN");
        config.sentry_environment = env.get("SENTRY_ENVIRONMENT");

        Ok(config)
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get a variable, treating blank values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|value| value.trim().parse::<T>().map_err(|e| invalid(key, e)))
            .transpose()
    }

    fn parse_required<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parse(key)?
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }
}

fn invalid(key: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}
