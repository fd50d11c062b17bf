//! Water-use licences.

use serde_json::Value;

use crate::api::messages;
use crate::api::types::{
  decode, decode_or_default, encode, License, LicenseFilter, LicenseStatistics, PageResponse,
};
use crate::api::{ApiClient, ApiError};

#[derive(Clone)]
pub struct LicenseService {
  api: ApiClient,
}

impl LicenseService {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }

  /// One page of licences matching `filter`.
  pub async fn list(&self, filter: &LicenseFilter) -> Result<PageResponse<License>, ApiError> {
    let value = self
      .api
      .get_data("giay-phep/danh-sach", Some(&filter.to_params()), true)
      .await?;
    decode_or_default(value)
  }

  pub async fn get(&self, id: i64) -> Result<Option<License>, ApiError> {
    let value = self
      .api
      .get_data(&format!("giay-phep/{}", id), None, true)
      .await?;
    if value.is_null() {
      return Ok(None);
    }
    decode(value).map(Some)
  }

  /// Create or update; `license.id` decides which.
  pub async fn save(&self, license: &License) -> Result<bool, ApiError> {
    let body = encode(license)?;
    let response = self
      .api
      .save_data("giay-phep/luu", &body, Some(messages::LICENSE_SAVED), true)
      .await?;
    Ok(!response.is_null())
  }

  pub async fn delete(&self, id: i64) -> Result<bool, ApiError> {
    self
      .confirm(&format!("giay-phep/xoa/{}", id), messages::LICENSE_DELETED)
      .await
  }

  pub async fn approve(&self, id: i64) -> Result<bool, ApiError> {
    self
      .confirm(&format!("giay-phep/duyet/{}", id), messages::LICENSE_APPROVED)
      .await
  }

  pub async fn cancel_approval(&self, id: i64) -> Result<bool, ApiError> {
    self
      .confirm(
        &format!("giay-phep/huy-duyet/{}", id),
        messages::LICENSE_APPROVAL_CANCELLED,
      )
      .await
  }

  /// Licence counts per validity bucket.
  pub async fn statistics(&self, filter: &LicenseFilter) -> Result<LicenseStatistics, ApiError> {
    let value = self
      .api
      .get_data("giay-phep/dem-theo-hieu-luc", Some(&filter.to_params()), true)
      .await?;
    decode_or_default(value)
  }

  /// Action endpoints are GETs answering a bare `true` on success.
  async fn confirm(&self, endpoint: &str, message: &str) -> Result<bool, ApiError> {
    let value = self.api.get_data(endpoint, None, true).await?;
    self.api.hooks().success(message);
    Ok(value == Value::Bool(true))
  }
}
