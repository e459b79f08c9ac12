//! Remote product catalog: HTTP client and paginated feed.
//!
//! # Architecture
//!
//! - [`CatalogSource`] is the seam between the feed and the network. The
//!   production implementation is [`CatalogClient`] (REST over `reqwest`);
//!   tests substitute in-memory sources.
//! - [`CatalogFeed`] accumulates pages, tracks the pagination cursor, and
//!   exposes a filtered view for free-text search.
//! - The catalog is the source of truth. Products are never mutated locally.
//!
//! # Example
//!
//! ```rust,ignore
//! use open_fashion_storefront::catalog::{CatalogClient, CatalogFeed};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let feed = CatalogFeed::new(client);
//!
//! feed.load_initial().await?;
//! feed.load_more().await;
//! feed.set_query("shirt");
//! for product in feed.visible_items() {
//!     println!("{} {}", product.title, product.price.whole());
//! }
//! ```

mod client;
mod feed;
pub mod types;

use std::future::Future;

pub use client::CatalogClient;
pub use feed::{CatalogFeed, FeedStatus, LoadMoreOutcome};
pub use types::*;

use thiserror::Error;

/// Message shown to shoppers when the catalog cannot be reached.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch products. Please try again.";

/// Errors that can occur when fetching from the catalog API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The response body was not the expected JSON.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    /// Shopper-facing message, free of transport details.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }

    /// Whether the failure was a request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// A paginated source of catalog products.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of products. Pages are 1-indexed.
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<Vec<Product>, FetchError>> + Send;
}

impl<S: CatalogSource> CatalogSource for std::sync::Arc<S> {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<Vec<Product>, FetchError>> + Send {
        (**self).fetch_page(page)
    }
}
