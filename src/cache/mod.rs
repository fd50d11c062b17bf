//! Memoization of read-mostly reference data.
//!
//! This module provides an endpoint-agnostic caching mechanism that:
//! - Keys entries by endpoint plus serialized query params
//! - Serves entries younger than the TTL without touching the network
//! - Persists the whole table to the durable store after every change
//! - Drops expired entries when rehydrating at start-up

mod keys;
mod layer;
mod traits;

pub use keys::{cache_key, MasterDataKey};
pub use layer::CacheLayer;
pub use traits::{CacheEntry, CacheResult, CacheSource, Clock, SystemClock};
