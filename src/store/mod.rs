//! Durable key-value persistence.
//!
//! Everything the client persists between runs goes through [`KeyValueStore`]:
//! the session token under [`TOKEN_KEY`] and the serialized cache table under
//! [`CACHE_KEY`].

mod sqlite;

use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub use sqlite::SqliteStore;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Storage key holding the serialized cache entry table.
pub const CACHE_KEY: &str = "api_cache";

/// Store handle shared between the session and the cache layer.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Trait for durable key-value backends.
pub trait KeyValueStore: Send + Sync {
  /// Read the value stored under `key`.
  fn get(&self, key: &str) -> Result<Option<String>>;

  /// Store `value` under `key`, replacing any previous value.
  fn set(&self, key: &str, value: &str) -> Result<()>;

  /// Remove `key`. Removing a missing key is not an error.
  fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store, lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
  values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let values = self
      .values
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(values.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    let mut values = self
      .values
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    values.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let mut values = self
      .values
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    values.remove(key);
    Ok(())
  }
}

/// Store that doesn't keep anything.
/// Used when caching is disabled - all writes are discarded.
pub struct NoopStore;

impl KeyValueStore for NoopStore {
  fn get(&self, _key: &str) -> Result<Option<String>> {
    Ok(None) // Always miss
  }

  fn set(&self, _key: &str, _value: &str) -> Result<()> {
    Ok(()) // Discard
  }

  fn remove(&self, _key: &str) -> Result<()> {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_store_roundtrip() {
    let store = MemoryStore::new();
    assert_eq!(store.get("a").unwrap(), None);

    store.set("a", "1").unwrap();
    store.set("a", "2").unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));

    store.remove("a").unwrap();
    assert_eq!(store.get("a").unwrap(), None);
  }

  #[test]
  fn test_remove_missing_key_is_ok() {
    let store = MemoryStore::new();
    assert!(store.remove("missing").is_ok());
  }

  #[test]
  fn test_noop_store_discards() {
    let store = NoopStore;
    store.set(TOKEN_KEY, "abc").unwrap();
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
  }
}
