//! Persisted cart store.
//!
//! [`CartStore`] owns the in-memory cart and mirrors every mutation to a
//! [`KeyValueStore`] as one JSON array under a single key.
//!
//! # Guarantees
//!
//! - Mutations are serialized through one async mutex, so concurrent `add`
//!   calls never lose an update and the stored blob always matches some
//!   published cart.
//! - Persistence is best-effort. Read and write failures are reported to the
//!   [`CartObserver`] and never returned to callers; the in-memory cart is
//!   updated even when the write fails.
//! - An unreadable stored cart is treated as a fresh session (empty cart).

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument};

use crate::cart::Cart;
use crate::catalog::Product;
use crate::storage::{KeyValueStore, PersistenceError};
use open_fashion_core::ProductId;

/// Default storage key for the cart blob.
pub const DEFAULT_CART_KEY: &str = "Cart";

/// Cart operation that touched storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Load,
    Add,
    Remove,
    UpdateQuantity,
    Clear,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::UpdateQuantity => "update_quantity",
            Self::Clear => "clear",
        };
        f.write_str(name)
    }
}

/// Receives cart persistence failures.
///
/// The store swallows these errors by contract; an observer is how they get
/// reported (logs, metrics, tests).
pub trait CartObserver: Send + Sync {
    /// Reading or writing the durable store failed.
    fn persistence_failed(&self, operation: CartOperation, error: &PersistenceError);

    /// A stored cart existed but could not be decoded and was discarded.
    fn stored_cart_discarded(&self, error: &serde_json::Error) {
        let _ = error;
    }
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CartObserver for TracingObserver {
    fn persistence_failed(&self, operation: CartOperation, error: &PersistenceError) {
        tracing::error!(%operation, error = %error, "Cart persistence failed");
    }

    fn stored_cart_discarded(&self, error: &serde_json::Error) {
        tracing::warn!(error = %error, "Stored cart unreadable, starting empty");
    }
}

/// Single source of truth for the shopping cart.
///
/// Create one per session and share it by reference (or `Arc`).
pub struct CartStore<K> {
    storage: K,
    key: String,
    observer: Arc<dyn CartObserver>,
    /// Held for the whole read-modify-persist-publish cycle.
    writer: Mutex<()>,
    current: watch::Sender<Arc<Cart>>,
}

impl<K: KeyValueStore> CartStore<K> {
    /// Create a store with an empty cart, persisting under [`DEFAULT_CART_KEY`].
    ///
    /// Call [`Self::load`] once at startup to restore a previous session.
    #[must_use]
    pub fn new(storage: K) -> Self {
        let (current, _) = watch::channel(Arc::new(Cart::new()));
        Self {
            storage,
            key: DEFAULT_CART_KEY.to_string(),
            observer: Arc::new(TracingObserver),
            writer: Mutex::new(()),
            current,
        }
    }

    /// Persist under `key` instead of the default.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Report persistence failures to `observer` instead of the log.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CartObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Restore the cart from storage.
    ///
    /// A missing key, a read failure, or an undecodable blob all yield an
    /// empty cart; none of them is returned as an error.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn load(&self) {
        let _writer = self.writer.lock().await;

        let cart = match self.storage.get(&self.key).await {
            Ok(Some(blob)) => match serde_json::from_str::<Cart>(&blob) {
                Ok(cart) => cart.normalized(),
                Err(e) => {
                    self.observer.stored_cart_discarded(&e);
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                self.observer.persistence_failed(CartOperation::Load, &e);
                Cart::new()
            }
        };

        debug!(items = cart.len(), "Cart loaded");
        self.current.send_replace(Arc::new(cart));
    }

    /// Add one unit of `product`, appending a new line on first add.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, product: &Product) {
        self.mutate(CartOperation::Add, |cart| cart.with_added(product))
            .await;
    }

    /// Remove the line for `id`. Unknown IDs are a no-op.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: ProductId) {
        self.mutate(CartOperation::Remove, |cart| cart.without(id))
            .await;
    }

    /// Set the quantity for `id`. Values below 1 are stored as 1; unknown IDs
    /// are a no-op.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_quantity(&self, id: ProductId, quantity: u32) {
        if quantity == 0 {
            debug!("Clamping quantity to 1");
        }
        self.mutate(CartOperation::UpdateQuantity, |cart| {
            cart.with_quantity(id, quantity)
        })
        .await;
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        self.mutate(CartOperation::Clear, |_| Cart::new()).await;
    }

    /// The current cart. Cheap: shares the published snapshot.
    #[must_use]
    pub fn current_cart(&self) -> Arc<Cart> {
        Arc::clone(&self.current.borrow())
    }

    /// Watch every cart published from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.current.subscribe()
    }

    /// Apply `f` to the current cart, persist the result, then publish it.
    async fn mutate(&self, operation: CartOperation, f: impl FnOnce(&Cart) -> Cart) {
        let _writer = self.writer.lock().await;

        let next = f(&self.current_cart());
        if let Err(e) = self.persist(&next).await {
            self.observer.persistence_failed(operation, &e);
        }

        debug!(%operation, items = next.len(), "Cart updated");
        self.current.send_replace(Arc::new(next));
    }

    async fn persist(&self, cart: &Cart) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(cart)?;
        self.storage.set(&self.key, blob).await
    }
}
