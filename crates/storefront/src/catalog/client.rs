//! REST client for the product catalog API.
//!
//! Uses `reqwest` with a per-request timeout so a stalled connection surfaces
//! as a [`FetchError`] instead of an indefinitely spinning feed.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::catalog::{CatalogSource, FetchError, Product};
use crate::config::CatalogConfig;
use open_fashion_core::ProductId;

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog REST API.
///
/// Cheaply cloneable; clones share the underlying connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    page_size: u32,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                page_size: config.page_size,
            }),
        })
    }

    /// Number of products requested per page.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    /// Fetch one page of products (`GET /products?limit={L}&page={N}`).
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status, or a body that
    /// is not a JSON array of products.
    #[instrument(skip(self), fields(limit = self.inner.page_size))]
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<Product>, FetchError> {
        let mut url = self.endpoint(&["products"])?;
        url.query_pairs_mut()
            .append_pair("limit", &self.inner.page_size.to_string())
            .append_pair("page", &page.to_string());

        let products: Vec<Product> = self.get_json(url).await?;
        debug!(count = products.len(), "Fetched catalog page");
        Ok(products)
    }

    /// Fetch a single product (`GET /products/{id}`).
    ///
    /// Returns `Ok(None)` for unknown IDs. The API answers those with a 404,
    /// an empty body, or `null`, depending on the deployment.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, any other non-success status, or an
    /// undecodable body.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, FetchError> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        let body = match self.get_text(url).await {
            Ok(body) => body,
            Err(FetchError::Status { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        if body.trim().is_empty() {
            debug!("Catalog returned an empty body for product");
            return Ok(None);
        }
        decode(&body)
    }

    /// Build an endpoint URL by appending path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let body = self.get_text(url).await?;
        decode(&body)
    }

    /// Issue a GET and return the body of a successful response.
    async fn get_text(&self, url: Url) -> Result<String, FetchError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse catalog response"
        );
        FetchError::Decode(e.to_string())
    })
}

impl CatalogSource for CatalogClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Product>, FetchError> {
        Self::fetch_page(self, page).await
    }
}
