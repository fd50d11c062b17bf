//! API client wrapped with transparent caching for reference data.

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::cache::{CacheLayer, MasterDataKey};

use super::client::ApiClient;
use super::error::ApiError;
use super::types::decode_or_default;

/// Outcome of warming the reference-data cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadSummary {
  pub loaded: usize,
  pub failed: usize,
}

/// API client with transparent caching support.
///
/// Wraps [`ApiClient`] and memoizes GET lookups in a [`CacheLayer`]. Cached
/// fetches never toggle the global loading indicator.
#[derive(Clone)]
pub struct CachedApiClient {
  inner: ApiClient,
  cache: CacheLayer,
}

impl CachedApiClient {
  pub fn new(inner: ApiClient, cache: CacheLayer) -> Self {
    Self { inner, cache }
  }

  pub fn api(&self) -> &ApiClient {
    &self.inner
  }

  pub fn cache(&self) -> &CacheLayer {
    &self.cache
  }

  /// Get `key` (with optional params) from cache, or from the network when
  /// the entry is missing, expired or `force_refresh` is set.
  pub async fn get_cached(
    &self,
    key: impl Into<MasterDataKey>,
    params: Option<&Value>,
    force_refresh: bool,
  ) -> Result<Value, ApiError> {
    let key = key.into();
    let cache_key = key.cache_key(params);

    let result = self
      .cache
      .fetch(&cache_key, force_refresh, || {
        let inner = self.inner.clone();
        let endpoint = key.endpoint().to_string();
        let params = params.cloned();
        async move { inner.get_data(&endpoint, params.as_ref(), false).await }
      })
      .await?;

    Ok(result.data)
  }

  /// Typed variant of [`get_cached`](Self::get_cached); `null` decodes to the default.
  pub async fn get_cached_as<T: DeserializeOwned + Default>(
    &self,
    key: impl Into<MasterDataKey>,
    params: Option<&Value>,
  ) -> Result<T, ApiError> {
    let value = self.get_cached(key, params, false).await?;
    decode_or_default(value)
  }

  /// Drop the single entry for `key` and `params`.
  pub fn invalidate_cache(&self, key: impl Into<MasterDataKey>, params: Option<&Value>) {
    self.cache.invalidate(&key.into().cache_key(params));
  }

  /// Drop every cached entry.
  pub fn clear_all_cache(&self) {
    self.cache.clear();
  }

  /// Warm the cache for every preload key concurrently.
  ///
  /// Individual failures are logged and counted, never raised.
  pub async fn preload_master_data(&self) -> PreloadSummary {
    let fetches = MasterDataKey::PRELOAD
      .into_iter()
      .map(|key| async move {
        let endpoint = key.endpoint().to_string();
        (endpoint, self.get_cached(key, None, false).await)
      });

    let mut summary = PreloadSummary::default();
    for (endpoint, result) in join_all(fetches).await {
      match result {
        Ok(_) => summary.loaded += 1,
        Err(e) => {
          warn!(endpoint = %endpoint, "Failed to preload reference data: {}", e);
          summary.failed += 1;
        }
      }
    }

    info!(
      loaded = summary.loaded,
      failed = summary.failed,
      "Reference data preloaded"
    );
    summary
  }

  // Reference-data accessors

  pub async fn districts(&self) -> Result<Vec<Value>, ApiError> {
    self.get_cached_as(MasterDataKey::Districts, None).await
  }

  /// Communes, optionally limited to one district.
  pub async fn communes(&self, district_id: Option<i64>) -> Result<Vec<Value>, ApiError> {
    let params = district_id.map(|id| json!({ "huyenId": id }));
    self
      .get_cached_as(MasterDataKey::Communes, params.as_ref())
      .await
  }

  pub async fn river_basins(&self) -> Result<Vec<Value>, ApiError> {
    self.get_cached_as(MasterDataKey::RiverBasins, None).await
  }

  pub async fn construction_types(&self) -> Result<Vec<Value>, ApiError> {
    self
      .get_cached_as(MasterDataKey::ConstructionTypes, None)
      .await
  }

  pub async fn aquifers(&self) -> Result<Vec<Value>, ApiError> {
    self.get_cached_as(MasterDataKey::Aquifers, None).await
  }

  pub async fn rivers(&self) -> Result<Vec<Value>, ApiError> {
    self.get_cached_as(MasterDataKey::Rivers, None).await
  }

  pub async fn license_types(&self) -> Result<Vec<Value>, ApiError> {
    self.get_cached_as(MasterDataKey::LicenseTypes, None).await
  }
}
