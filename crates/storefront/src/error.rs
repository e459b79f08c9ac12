//! Unified error handling for storefront front-ends.
//!
//! Library operations that can fail return their own error types
//! ([`ConfigError`], [`FetchError`], [`PersistenceError`]). Front-ends that
//! chain several of them return `Result<T, AppError>`.

use thiserror::Error;

use crate::catalog::FetchError;
use crate::config::ConfigError;
use crate::storage::PersistenceError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Fetch(#[from] FetchError),

    /// Durable storage operation failed.
    #[error("Storage error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Message safe to show a shopper.
    ///
    /// Catalog and storage failures are reported generically; details go to
    /// the log instead.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch(err) => err.user_message().to_string(),
            Self::Persistence(_) => "Your cart could not be saved.".to_string(),
            Self::Config(_) | Self::NotFound(_) => self.to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::from(ConfigError::InvalidEnvVar(
            "CATALOG_PAGE_SIZE".to_string(),
            "invalid digit found in string".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid environment variable CATALOG_PAGE_SIZE: invalid digit found in string"
        );
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = AppError::from(FetchError::Status {
            status: 502,
            message: "upstream connect error".to_string(),
        });
        assert_eq!(err.user_message(), "Failed to fetch products. Please try again.");

        let err = AppError::from(PersistenceError::Backend("disk full".to_string()));
        assert!(!err.user_message().contains("disk full"));
    }
}
