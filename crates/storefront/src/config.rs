//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CATALOG_BASE_URL` - Catalog API base URL (default: <https://fakestoreapi.com>)
//! - `CATALOG_PAGE_SIZE` - Products per page (default: 14)
//! - `CATALOG_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `CART_DATA_DIR` - Directory for the persisted cart (default: `.open-fashion`)
//! - `CART_STORAGE_KEY` - Storage key for the cart blob (default: `Cart`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::cart::DEFAULT_CART_KEY;
use crate::storage::FileStore;

const DEFAULT_CATALOG_BASE_URL: &str = "https://fakestoreapi.com";
const DEFAULT_PAGE_SIZE: u32 = 14;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DATA_DIR: &str = ".open-fashion";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Cart persistence configuration
    pub cart: CartConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: Url,
    /// Products requested per page
    pub page_size: u32,
    /// Timeout applied to every catalog request
    pub request_timeout: Duration,
}

/// Cart persistence configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Directory holding the persisted cart file
    pub data_dir: PathBuf,
    /// Key the cart blob is stored under
    pub storage_key: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let base_url = env.or_default("CATALOG_BASE_URL", DEFAULT_CATALOG_BASE_URL);
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_BASE_URL".to_string(), e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_BASE_URL".to_string(),
                "must be a hierarchical URL such as https://host/".to_string(),
            ));
        }

        let page_size = env.parsed("CATALOG_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let timeout_secs = env.parsed("CATALOG_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        let catalog = CatalogConfig {
            base_url,
            page_size,
            request_timeout: Duration::from_secs(timeout_secs),
        };

        let storage_key = env.or_default("CART_STORAGE_KEY", DEFAULT_CART_KEY);
        if !FileStore::is_valid_key(&storage_key) {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "only letters, digits, '-', '_' and '.' are allowed, not starting with '.'"
                    .to_string(),
            ));
        }

        let cart = CartConfig {
            data_dir: PathBuf::from(env.or_default("CART_DATA_DIR", DEFAULT_DATA_DIR)),
            storage_key,
        };

        Ok(Self {
            catalog,
            cart,
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}
