//! Cart commands.
//!
//! The cart is restored when the [`Session`] opens and every change is
//! written back by the store before the command returns.

use open_fashion_core::ProductId;
use open_fashion_storefront::cart::Cart;
use open_fashion_storefront::error::AppError;

use super::{Session, line_row};

/// List cart contents.
#[allow(clippy::print_stdout)]
pub fn show(session: &Session) {
    let cart = session.cart.current_cart();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    print_lines(&cart);
    println!("\n{} item(s), subtotal {}", cart.item_count(), cart.subtotal());
}

/// Fetch a product snapshot and add one unit of it.
///
/// # Errors
///
/// Returns error if the product is unknown or cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn add(session: &Session, id: ProductId) -> Result<(), AppError> {
    let product = session.product(id).await?;
    session.cart.add(&product).await;

    let quantity = session
        .cart
        .current_cart()
        .get(id)
        .map_or(1, |item| item.quantity);
    println!("Added {} (quantity {quantity})", product.title);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn remove(session: &Session, id: ProductId) {
    if session.cart.current_cart().get(id).is_none() {
        println!("Product {id} is not in your cart.");
        return;
    }
    session.cart.remove(id).await;
    println!("Removed product {id}.");
}

/// Set the quantity of a product already in the cart.
#[allow(clippy::print_stdout)]
pub async fn set_quantity(session: &Session, id: ProductId, quantity: u32) {
    if session.cart.current_cart().get(id).is_none() {
        println!("Product {id} is not in your cart.");
        return;
    }
    session.cart.update_quantity(id, quantity).await;

    let stored = session
        .cart
        .current_cart()
        .get(id)
        .map_or(quantity, |item| item.quantity);
    println!("Product {id} quantity set to {stored}.");
}

#[allow(clippy::print_stdout)]
pub async fn clear(session: &Session) {
    session.cart.clear().await;
    println!("Cart cleared.");
}

/// Print the cart with the estimated total.
#[allow(clippy::print_stdout)]
pub fn checkout(session: &Session) {
    let cart = session.cart.current_cart();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    print_lines(&cart);
    println!("\nEST. TOTAL  {}", cart.estimated_total());
}

#[allow(clippy::print_stdout)]
fn print_lines(cart: &Cart) {
    for item in cart.items() {
        println!("{}", line_row(item));
    }
}
