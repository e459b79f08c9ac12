//! Domain types for the remote product catalog.

use open_fashion_core::{Price, ProductId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Product Types
// =============================================================================

/// Aggregate customer rating attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating value (e.g., 3.9).
    pub rate: f64,
    /// Total number of ratings.
    pub count: u32,
}

/// A read-only product snapshot as returned by the catalog API.
///
/// Fields the catalog sends beyond the ones modelled here are kept in
/// [`Product::extra`] and written back out unchanged, so a cart line stays a
/// verbatim copy of what the catalog returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID (stable across pages).
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Category name (e.g., "men's clothing").
    pub category: String,
    /// Image URL.
    pub image: String,
    /// Long-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Customer rating, when the catalog provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    /// Any other fields, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Case-insensitive substring match against title or category.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.category.to_lowercase().contains(needle)
    }
}
