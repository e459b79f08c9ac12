//! Command implementations and shared formatting.

pub mod cart;
pub mod catalog;

use open_fashion_core::ProductId;
use open_fashion_storefront::cart::{CartStore, LineItem};
use open_fashion_storefront::catalog::{CatalogClient, Product};
use open_fashion_storefront::config::StorefrontConfig;
use open_fashion_storefront::error::AppError;
use open_fashion_storefront::storage::FileStore;

/// Everything a command needs: the catalog client and the restored cart.
pub struct Session {
    pub catalog: CatalogClient,
    pub cart: CartStore<FileStore>,
}

impl Session {
    /// Build the catalog client and restore the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub async fn open(config: &StorefrontConfig) -> Result<Self, AppError> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let cart = CartStore::new(FileStore::new(&config.cart.data_dir))
            .with_key(config.cart.storage_key.as_str());
        cart.load().await;

        Ok(Self { catalog, cart })
    }

    /// Fetch a product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown ID, or the fetch error.
    pub async fn product(&self, id: ProductId) -> Result<Product, AppError> {
        let product = self.catalog.fetch_product(id).await?;
        require_product(id, product)
    }
}

fn require_product(id: ProductId, product: Option<Product>) -> Result<Product, AppError> {
    product.ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// One catalog row: id, whole-unit price, title, category.
fn product_row(product: &Product) -> String {
    format!(
        "{:>4}  {:>6}  {}  ({})",
        product.id.to_string(),
        product.price.whole().to_string(),
        product.title,
        product.category
    )
}

/// One cart row: id, quantity, unit price, line total, title.
fn line_row(item: &LineItem) -> String {
    format!(
        "{:>4}  {:>3} x {:>8}  = {:>9}  {}",
        item.id().to_string(),
        item.quantity,
        item.product.price.to_string(),
        item.line_total().to_string(),
        item.product.title
    )
}
