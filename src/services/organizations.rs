//! Licence holders: organisations and individuals.

use serde_json::Value;

use crate::api::types::{decode, decode_or_default, encode, Organization};
use crate::api::wire::is_empty_payload;
use crate::api::{ApiClient, ApiError};

#[derive(Clone)]
pub struct OrganizationService {
  api: ApiClient,
}

impl OrganizationService {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }

  pub async fn list(&self, use_global_loading: bool) -> Result<Vec<Organization>, ApiError> {
    let value = self
      .api
      .get_data("to-chuc-ca-nhan/danh-sach", None, use_global_loading)
      .await?;
    decode_or_default(value)
  }

  pub async fn get(&self, id: i64, use_global_loading: bool) -> Result<Option<Organization>, ApiError> {
    let value = self
      .api
      .get_data(&format!("to-chuc-ca-nhan/{}", id), None, use_global_loading)
      .await?;
    if value.is_null() {
      return Ok(None);
    }
    decode(value).map(Some)
  }

  pub async fn save(&self, org: &Organization, use_global_loading: bool) -> Result<bool, ApiError> {
    let body = encode(org)?;
    let response = self
      .api
      .save_data("to-chuc-ca-nhan/luu", &body, None, use_global_loading)
      .await?;
    Ok(accepted(&response))
  }

  pub async fn delete(&self, id: i64, use_global_loading: bool) -> Result<bool, ApiError> {
    let response = self
      .api
      .get_data(
        &format!("to-chuc-ca-nhan/xoa/{}", id),
        None,
        use_global_loading,
      )
      .await?;
    Ok(accepted(&response))
  }
}

/// A non-empty body without an `error` flag.
fn accepted(response: &Value) -> bool {
  if is_empty_payload(response) {
    return false;
  }
  match response.get("error") {
    Some(flag) => is_empty_payload(flag),
    None => true,
  }
}
