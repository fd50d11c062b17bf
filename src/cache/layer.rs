//! Cache layer that orchestrates caching logic with network fetching.

use chrono::Duration;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::api::wire::is_empty_payload;
use crate::api::ApiError;
use crate::store::{SharedStore, CACHE_KEY};

use super::traits::{CacheEntry, CacheResult, Clock, SystemClock};

type EntryTable = HashMap<String, CacheEntry>;

/// Cache layer that manages caching logic and network fetching.
///
/// Entries live in memory and the whole table is mirrored to the durable
/// store after every change, so a restart picks up where it left off.
///
/// Concurrent misses on the same key are not coalesced: each caller fetches
/// and the last response to arrive wins.
pub struct CacheLayer {
  store: SharedStore,
  entries: Arc<Mutex<EntryTable>>,
  clock: Arc<dyn Clock>,
  /// How long before cached data is considered stale
  ttl: Duration,
}

impl CacheLayer {
  pub const DEFAULT_TTL_HOURS: i64 = 24;

  /// Create a cache layer with the default TTL, rehydrated from `store`.
  pub fn new(store: SharedStore) -> Self {
    Self::open(
      store,
      Duration::hours(Self::DEFAULT_TTL_HOURS),
      Arc::new(SystemClock),
    )
  }

  /// Create a cache layer and rehydrate it from `store`.
  pub fn open(store: SharedStore, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
    let layer = Self {
      store,
      entries: Arc::new(Mutex::new(HashMap::new())),
      clock,
      ttl,
    };
    layer.reload();
    layer
  }

  /// Replace the in-memory table with the persisted one, dropping expired entries.
  pub fn reload(&self) {
    let persisted = match self.store.get(CACHE_KEY) {
      Ok(Some(blob)) => blob,
      Ok(None) => return,
      Err(e) => {
        warn!("Failed to read persisted cache: {}", e);
        return;
      }
    };

    let table: EntryTable = match serde_json::from_str(&persisted) {
      Ok(table) => table,
      Err(e) => {
        warn!("Discarding unreadable persisted cache: {}", e);
        return;
      }
    };

    let total = table.len();
    let fresh: EntryTable = table
      .into_iter()
      .filter(|(_, entry)| self.is_fresh(entry))
      .collect();
    debug!(loaded = fresh.len(), expired = total - fresh.len(), "Rehydrated cache");

    *self.lock() = fresh;
  }

  fn lock(&self) -> MutexGuard<'_, EntryTable> {
    // A panic while holding the lock leaves the map itself intact
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn is_fresh(&self, entry: &CacheEntry) -> bool {
    self.clock.now() - entry.stored_at < self.ttl
  }

  /// Fresh entry for `key`, if any.
  pub fn lookup(&self, key: &str) -> Option<CacheEntry> {
    self
      .lock()
      .get(key)
      .filter(|entry| self.is_fresh(entry))
      .cloned()
  }

  /// Entry for `key` regardless of age.
  pub fn peek(&self, key: &str) -> Option<CacheEntry> {
    self.lock().get(key).cloned()
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Unless `force_refresh`, return a fresh entry without calling `fetcher`
  /// 2. Otherwise fetch from the network
  /// 3. Store a non-empty result, overwriting any previous entry
  ///
  /// A failed fetch is returned as-is; stale entries are never served.
  pub async fn fetch<F, Fut>(
    &self,
    key: &str,
    force_refresh: bool,
    fetcher: F,
  ) -> Result<CacheResult<Value>, ApiError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, ApiError>>,
  {
    if !force_refresh {
      if let Some(cached) = self.lookup(key) {
        debug!(key, "Cache hit");
        return Ok(CacheResult::from_cache(cached.payload, cached.stored_at));
      }
    }

    debug!(key, force_refresh, "Cache miss, fetching");
    let data = fetcher().await?;
    if !is_empty_payload(&data) {
      self.store_entry(key, data.clone());
    }
    Ok(CacheResult::from_network(data))
  }

  /// Write an entry stamped with the current time and persist the table.
  pub fn store_entry(&self, key: &str, payload: Value) {
    let entry = CacheEntry {
      payload,
      stored_at: self.clock.now(),
    };
    self.lock().insert(key.to_string(), entry);
    self.persist();
  }

  /// Remove exactly one key. Missing keys are ignored.
  pub fn invalidate(&self, key: &str) {
    let removed = self.lock().remove(key).is_some();
    if removed {
      debug!(key, "Invalidated cache entry");
      self.persist();
    }
  }

  /// Remove every entry.
  pub fn clear(&self) {
    self.lock().clear();
    self.persist();
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Current keys, sorted.
  pub fn keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = self.lock().keys().cloned().collect();
    keys.sort();
    keys
  }

  /// Mirror the table to the durable store. Failures are logged, not raised.
  fn persist(&self) {
    let blob = {
      let entries = self.lock();
      serde_json::to_string(&*entries)
    };

    let result = blob
      .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize cache: {}", e))
      .and_then(|blob| self.store.set(CACHE_KEY, &blob));
    if let Err(e) = result {
      warn!("Failed to persist cache: {}", e);
    }
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      entries: Arc::clone(&self.entries),
      clock: Arc::clone(&self.clock),
      ttl: self.ttl,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::traits::ManualClock;
  use crate::store::{KeyValueStore, MemoryStore};
  use chrono::{DateTime, Utc};
  use serde_json::json;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
      .unwrap()
      .with_timezone(&Utc)
  }

  fn layer_with(store: SharedStore, clock: Arc<ManualClock>) -> CacheLayer {
    CacheLayer::open(store, Duration::hours(24), clock)
  }

  async fn counted_fetch(
    layer: &CacheLayer,
    key: &str,
    force: bool,
    calls: &AtomicUsize,
    value: Value,
  ) -> CacheResult<Value> {
    layer
      .fetch(key, force, move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
      })
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn test_fresh_entry_served_without_fetch() {
    let clock = Arc::new(ManualClock::new(start()));
    let layer = layer_with(Arc::new(MemoryStore::new()), clock.clone());
    let calls = AtomicUsize::new(0);

    counted_fetch(&layer, "loai-ct/danh-sach", false, &calls, json!([1])).await;
    clock.advance(Duration::hours(24) - Duration::milliseconds(1));
    let result = counted_fetch(&layer, "loai-ct/danh-sach", false, &calls, json!([2])).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.data, json!([1]));
    assert_eq!(result.source, crate::cache::CacheSource::Cache);
  }

  #[tokio::test]
  async fn test_expired_entry_triggers_one_fetch() {
    let clock = Arc::new(ManualClock::new(start()));
    let layer = layer_with(Arc::new(MemoryStore::new()), clock.clone());
    let calls = AtomicUsize::new(0);

    counted_fetch(&layer, "k", false, &calls, json!([1])).await;
    clock.advance(Duration::hours(24));
    let result = counted_fetch(&layer, "k", false, &calls, json!([2])).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(result.data, json!([2]));
    assert_eq!(layer.peek("k").unwrap().stored_at, clock.now());
  }

  #[tokio::test]
  async fn test_force_refresh_overwrites() {
    let clock = Arc::new(ManualClock::new(start()));
    let layer = layer_with(Arc::new(MemoryStore::new()), clock);
    let calls = AtomicUsize::new(0);

    counted_fetch(&layer, "k", false, &calls, json!({ "v": 1 })).await;
    let result = counted_fetch(&layer, "k", true, &calls, json!({ "v": 2 })).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(result.source, crate::cache::CacheSource::Network);
    assert_eq!(layer.lookup("k").unwrap().payload, json!({ "v": 2 }));
  }

  #[tokio::test]
  async fn test_invalidate_forces_refetch_and_is_idempotent() {
    let clock = Arc::new(ManualClock::new(start()));
    let layer = layer_with(Arc::new(MemoryStore::new()), clock);
    let calls = AtomicUsize::new(0);

    layer.invalidate("absent");

    counted_fetch(&layer, "k", false, &calls, json!([1])).await;
    layer.invalidate("k");
    layer.invalidate("k");
    counted_fetch(&layer, "k", false, &calls, json!([1])).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_empty_and_failed_results_are_not_stored() {
    let clock = Arc::new(ManualClock::new(start()));
    let layer = layer_with(Arc::new(MemoryStore::new()), clock);

    let result = layer.fetch("k", false, || async { Ok(Value::Null) }).await.unwrap();
    assert!(result.data.is_null());
    assert!(layer.is_empty());

    let err = layer
      .fetch("k", false, || async { Err(ApiError::NotFound) })
      .await
      .unwrap_err();
    assert_eq!(err, ApiError::NotFound);
    assert!(layer.is_empty());
  }

  #[tokio::test]
  async fn test_stale_entry_not_served_when_fetch_fails() {
    let clock = Arc::new(ManualClock::new(start()));
    let layer = layer_with(Arc::new(MemoryStore::new()), clock.clone());
    layer.store_entry("k", json!([1]));
    clock.advance(Duration::hours(25));

    let result = layer
      .fetch("k", false, || async {
        Err(ApiError::Connection("offline".into()))
      })
      .await;
    assert!(result.is_err());
  }

  #[test]
  fn test_table_survives_restart_and_expired_entries_drop() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start()));

    let layer = layer_with(store.clone(), clock.clone());
    layer.store_entry("old", json!(["a"]));
    clock.advance(Duration::hours(23));
    layer.store_entry("loai-ct/danh-sach", json!([{ "id": 1 }]));
    clock.advance(Duration::hours(2));

    let restarted = layer_with(store, clock);
    assert_eq!(restarted.keys(), vec!["loai-ct/danh-sach".to_string()]);
    assert_eq!(
      restarted.lookup("loai-ct/danh-sach").unwrap().payload,
      json!([{ "id": 1 }])
    );
  }

  #[test]
  fn test_clear_is_persisted() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start()));

    let layer = layer_with(store.clone(), clock.clone());
    layer.store_entry("a", json!(1));
    layer.store_entry("b", json!(2));
    layer.clear();

    assert!(layer.is_empty());
    assert!(layer_with(store, clock).is_empty());
  }

  #[test]
  fn test_corrupt_persisted_table_is_ignored() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    store.set(CACHE_KEY, "{not json").unwrap();

    let layer = layer_with(store, Arc::new(ManualClock::new(start())));
    assert!(layer.is_empty());
  }
}
