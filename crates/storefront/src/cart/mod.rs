//! Shopping cart: line items, totals, and the persisted cart store.
//!
//! The cart is an ordered list of [`LineItem`]s with at most one entry per
//! product. Each line item is a frozen copy of the product as it looked when
//! it was first added; it is never re-synced with the catalog.
//!
//! Mutations go through [`CartStore`], which persists the whole cart as one
//! JSON array and publishes the new state to subscribers.

mod store;

use std::collections::HashMap;

use open_fashion_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;

pub use store::{CartObserver, CartOperation, CartStore, DEFAULT_CART_KEY, TracingObserver};

// =============================================================================
// Line Items
// =============================================================================

/// One product plus quantity inside the cart.
///
/// Serializes flat: the product's fields with `quantity` alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product snapshot taken when the item was first added.
    #[serde(flatten)]
    pub product: Product,
    /// Number of units, always at least 1.
    pub quantity: u32,
}

impl LineItem {
    /// A new line item for one unit of `product`.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered cart contents. Insertion order is preserved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Line item for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Exact sum of every line total.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// The subtotal rounded down to a whole currency unit, as shown on the
    /// checkout bar.
    #[must_use]
    pub fn estimated_total(&self) -> Price {
        self.subtotal().whole()
    }

    /// Add one unit of `product`: bump the existing line or append a new one.
    #[must_use]
    pub fn with_added(&self, product: &Product) -> Self {
        let mut next = self.clone();
        match next.items.iter_mut().find(|item| item.id() == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => next.items.push(LineItem::new(product.clone())),
        }
        next
    }

    /// Drop the line for `id`. Unknown IDs leave the cart unchanged.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| item.id() != id)
                .cloned()
                .collect(),
        }
    }

    /// Set the quantity for `id`, clamped to at least 1. Unknown IDs leave
    /// the cart unchanged.
    #[must_use]
    pub fn with_quantity(&self, id: ProductId, quantity: u32) -> Self {
        let mut next = self.clone();
        if let Some(item) = next.items.iter_mut().find(|item| item.id() == id) {
            item.quantity = quantity.max(1);
        }
        next
    }

    /// Repair a cart read from storage: merge duplicate products (first
    /// position wins, quantities summed) and lift zero quantities to 1.
    #[must_use]
    pub(crate) fn normalized(self) -> Self {
        let mut positions: HashMap<ProductId, usize> = HashMap::new();
        let mut items: Vec<LineItem> = Vec::with_capacity(self.items.len());

        for mut item in self.items {
            item.quantity = item.quantity.max(1);
            if let Some(existing) = positions.get(&item.id()).and_then(|&i| items.get_mut(i)) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                positions.insert(item.id(), items.len());
                items.push(item);
            }
        }

        Self { items }
    }
}

impl From<Vec<LineItem>> for Cart {
    fn from(items: Vec<LineItem>) -> Self {
        Self { items }.normalized()
    }
}
