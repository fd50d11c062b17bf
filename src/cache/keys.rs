//! Cache keys for reference data.

use serde_json::Value;
use std::fmt;

/// Reference-data endpoints known to the cache, plus arbitrary endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MasterDataKey {
  /// Communes
  Communes,
  /// Districts
  Districts,
  /// River basins
  RiverBasins,
  /// Construction types
  ConstructionTypes,
  /// Aquifers
  Aquifers,
  /// Rivers
  Rivers,
  /// Sub-basins
  SubBasins,
  /// Licence types
  LicenseTypes,
  /// Any other GET endpoint
  Other(String),
}

impl MasterDataKey {
  /// Keys warmed at start-up.
  pub const PRELOAD: [MasterDataKey; 7] = [
    MasterDataKey::Communes,
    MasterDataKey::Districts,
    MasterDataKey::RiverBasins,
    MasterDataKey::ConstructionTypes,
    MasterDataKey::Aquifers,
    MasterDataKey::Rivers,
    MasterDataKey::LicenseTypes,
  ];

  /// Endpoint path, which doubles as the base cache key.
  pub fn endpoint(&self) -> &str {
    match self {
      Self::Communes => "hanh-chinh/xa/danh-sach",
      Self::Districts => "hanh-chinh/huyen/danh-sach",
      Self::RiverBasins => "LuuVucSong/danh-sach",
      Self::ConstructionTypes => "loai-ct/danh-sach",
      Self::Aquifers => "TangChuaNuoc/danh-sach",
      Self::Rivers => "Song/danh-sach",
      Self::SubBasins => "TieuLuuVuc/danh-sach",
      Self::LicenseTypes => "loai-gp/danh-sach",
      Self::Other(endpoint) => endpoint,
    }
  }

  /// Effective cache key for this endpoint and optional params.
  pub fn cache_key(&self, params: Option<&Value>) -> String {
    cache_key(self.endpoint(), params)
  }
}

impl From<&str> for MasterDataKey {
  fn from(endpoint: &str) -> Self {
    const CATALOG: [MasterDataKey; 8] = [
      MasterDataKey::Communes,
      MasterDataKey::Districts,
      MasterDataKey::RiverBasins,
      MasterDataKey::ConstructionTypes,
      MasterDataKey::Aquifers,
      MasterDataKey::Rivers,
      MasterDataKey::SubBasins,
      MasterDataKey::LicenseTypes,
    ];
    CATALOG
      .into_iter()
      .find(|k| k.endpoint() == endpoint)
      .unwrap_or_else(|| MasterDataKey::Other(endpoint.to_string()))
  }
}

impl fmt::Display for MasterDataKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.endpoint())
  }
}

/// Compose `key` and `params` into a single cache key.
///
/// Without params (or with `null`) the key is used as-is; otherwise params are
/// appended as compact JSON. Object keys serialize in sorted order, so equal
/// params always produce the same key.
pub fn cache_key(key: &str, params: Option<&Value>) -> String {
  match params.filter(|p| !p.is_null()) {
    Some(params) => format!("{}:{}", key, params),
    None => key.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_params_distinguish_entries() {
    assert_ne!(
      cache_key("a", Some(&json!({ "x": 1 }))),
      cache_key("a", Some(&json!({ "x": 2 })))
    );
    assert_eq!(cache_key("a", Some(&json!({ "x": 1 }))), "a:{\"x\":1}");
  }

  #[test]
  fn test_missing_and_null_params_are_same_entry() {
    assert_eq!(cache_key("a", None), "a");
    assert_eq!(cache_key("a", Some(&Value::Null)), "a");
  }

  #[test]
  fn test_param_order_does_not_matter() {
    let one: Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
    let two: Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
    assert_eq!(cache_key("k", Some(&one)), cache_key("k", Some(&two)));
  }

  #[test]
  fn test_catalog_lookup() {
    assert_eq!(
      MasterDataKey::from("loai-ct/danh-sach"),
      MasterDataKey::ConstructionTypes
    );
    assert_eq!(
      MasterDataKey::from("gp-loai"),
      MasterDataKey::Other("gp-loai".into())
    );
    assert!(!MasterDataKey::PRELOAD.contains(&MasterDataKey::SubBasins));
  }
}
