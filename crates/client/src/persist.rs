//! Durable key-value persistence capability.
//!
//! The host environment provides real durable storage; the engine only needs
//! scoped read/write of JSON values. Stores persist their full collection
//! after every mutation and read it back on boot, so persistence failures
//! are logged and swallowed - they must never break in-memory state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Well-known persistence keys.
pub mod keys {
    /// Guest/local cart collection.
    pub const CART: &str = "tidepool.cart";
    /// Guest/local wishlist collection.
    pub const WISHLIST: &str = "tidepool.wishlist";
}

/// Errors from the persistence capability.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The stored value could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The backend rejected the read or write.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Scoped read/write access to durable storage.
///
/// Reads and writes are synchronous; the engine is single-threaded over
/// them, so there is no contention model.
pub trait KeyValueStore {
    /// Read the raw JSON value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, PersistError>;

    /// Store a raw JSON value under `key`, overwriting any prior value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), PersistError>;

    /// Remove the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// Read and decode a typed value.
///
/// # Errors
///
/// Returns an error if the backend read fails or the value does not decode.
pub fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, PersistError> {
    store
        .get(key)?
        .map(|value| serde_json::from_value(value).map_err(PersistError::from))
        .transpose()
}

/// Encode and store a typed value.
///
/// # Errors
///
/// Returns an error if encoding or the backend write fails.
pub fn save<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    store.set(key, serde_json::to_value(value)?)
}

/// In-memory `KeyValueStore` for tests and hosts without durable storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, serde_json::Value>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, PersistError> {
        let values = self
            .values
            .lock()
            .map_err(|e| PersistError::Backend(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), PersistError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| PersistError::Backend(e.to_string()))?;
        values.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| PersistError::Backend(e.to_string()))?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        save(&store, "k", &vec![1u32, 2, 3]).unwrap();
        let back: Option<Vec<u32>> = load(&store, "k").unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        let got: Option<Vec<u32>> = load(&store, "absent").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn test_remove_clears_value() {
        let store = MemoryStore::new();
        save(&store, "k", &1u32).unwrap();
        store.remove("k").unwrap();
        let got: Option<u32> = load(&store, "k").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn test_clones_share_backing_map() {
        let store = MemoryStore::new();
        let other = store.clone();
        save(&store, "k", &7u32).unwrap();
        let got: Option<u32> = load(&other, "k").unwrap();
        assert_eq!(got, Some(7));
    }
}
