//! Durable key-value storage for client-side state.
//!
//! The cart is persisted as a single serialized blob under one key, so the
//! storage contract is deliberately small: read a string, replace a string.
//!
//! # Backends
//!
//! - [`MemoryStore`] - In-process map, for tests and throwaway sessions
//! - [`FileStore`] - One file per key inside a data directory

mod file;
mod memory;

use std::future::Future;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors that can occur when reading or writing the durable store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The key cannot be mapped onto the backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Async string key-value store.
///
/// Implementations must be thread-safe (`Send + Sync`). A `set` either fully
/// replaces the stored value or fails; partial writes must never be
/// observable through `get`.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing was stored.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, PersistenceError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

impl<K: KeyValueStore> KeyValueStore for std::sync::Arc<K> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, PersistenceError>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        (**self).set(key, value)
    }
}
