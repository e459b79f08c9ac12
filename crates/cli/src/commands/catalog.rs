//! Catalog browsing commands.

use open_fashion_core::ProductId;
use open_fashion_storefront::catalog::{CatalogFeed, LoadMoreOutcome};
use open_fashion_storefront::error::AppError;

use super::{Session, product_row};

/// List up to `pages` pages of products, optionally filtered by `query`.
///
/// # Errors
///
/// Returns error if the first page cannot be fetched. Later pages that fail
/// are logged and the listing stops there.
#[allow(clippy::print_stdout)]
pub async fn list(session: &Session, pages: u32, query: Option<&str>) -> Result<(), AppError> {
    let feed = CatalogFeed::new(session.catalog.clone());
    feed.load_initial().await?;

    for _ in 1..pages {
        match feed.load_more().await {
            LoadMoreOutcome::Appended(0) => {
                tracing::info!(page = feed.page(), "Reached end of catalog");
                break;
            }
            LoadMoreOutcome::Appended(_) => {}
            LoadMoreOutcome::Failed | LoadMoreOutcome::Skipped | LoadMoreOutcome::Discarded => {
                break;
            }
        }
    }

    if let Some(query) = query {
        feed.set_query(query);
    }

    let visible = feed.visible_items();
    for product in &visible {
        println!("{}", product_row(product));
    }
    println!(
        "\nShowing {} of {} products ({} page(s) of {})",
        visible.len(),
        feed.len(),
        feed.page(),
        session.catalog.page_size()
    );
    Ok(())
}

/// Print one product in full.
///
/// # Errors
///
/// Returns error if the product is unknown or cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn show(session: &Session, id: ProductId) -> Result<(), AppError> {
    let product = session.product(id).await?;

    println!("{}", product.title);
    println!("{}", product.category);
    println!("{}", product.price);
    if let Some(rating) = &product.rating {
        println!("Rated {:.1} ({} reviews)", rating.rate, rating.count);
    }
    if let Some(description) = &product.description {
        println!("\n{description}");
    }
    println!("\n{}", product.image);
    Ok(())
}
