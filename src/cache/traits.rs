//! Core types for the caching system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One memoized response.
///
/// Serialized as `{"data": ..., "timestamp": <epoch ms>}` inside the persisted
/// table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
  /// Last successfully fetched response body
  #[serde(rename = "data")]
  pub payload: Value,
  /// When that fetch completed
  #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
  pub stored_at: DateTime<Utc>,
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where returned data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched from the network during this call
  Network,
  /// Served from a fresh cache entry
  Cache,
}

/// Time source for expiry checks.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Clock that only moves when told to.
#[cfg(test)]
pub(crate) struct ManualClock {
  now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
  pub(crate) fn new(start: DateTime<Utc>) -> Self {
    Self {
      now: std::sync::Mutex::new(start),
    }
  }

  pub(crate) fn advance(&self, by: chrono::Duration) {
    *self.now.lock().unwrap() += by;
  }
}

#[cfg(test)]
impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_entry_wire_format() {
    let entry = CacheEntry {
      payload: json!([{ "id": 1 }]),
      stored_at: DateTime::from_timestamp_millis(1_704_067_200_000).unwrap(),
    };

    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value, json!({ "data": [{ "id": 1 }], "timestamp": 1_704_067_200_000i64 }));

    let back: CacheEntry = serde_json::from_value(value).unwrap();
    assert_eq!(back, entry);
  }

  #[test]
  fn test_manual_clock_advances() {
    let start = DateTime::from_timestamp_millis(0).unwrap();
    let clock = ManualClock::new(start);
    clock.advance(chrono::Duration::hours(2));
    assert_eq!(clock.now() - start, chrono::Duration::hours(2));
  }
}
