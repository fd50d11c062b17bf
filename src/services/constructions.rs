//! Water-use constructions (wells, pumping stations, reservoirs).

use crate::api::messages;
use crate::api::types::{decode, decode_or_default, encode, Construction, ConstructionFilter};
use crate::api::{ApiClient, ApiError};

#[derive(Clone)]
pub struct ConstructionService {
  api: ApiClient,
}

impl ConstructionService {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }

  pub async fn list(&self, filter: &ConstructionFilter) -> Result<Vec<Construction>, ApiError> {
    let params = encode(filter)?;
    let value = self
      .api
      .get_data("cong-trinh/danh-sach", Some(&params), true)
      .await?;
    decode_or_default(value)
  }

  pub async fn get(&self, id: i64) -> Result<Option<Construction>, ApiError> {
    let value = self
      .api
      .get_data(&format!("cong-trinh/{}", id), None, true)
      .await?;
    if value.is_null() {
      return Ok(None);
    }
    decode(value).map(Some)
  }

  /// The construction linked to the logged-in account.
  pub async fn mine(&self) -> Result<Option<Construction>, ApiError> {
    let value = self
      .api
      .get_data("ct-thong-tin/my-construction", None, true)
      .await?;
    if value.is_null() {
      return Ok(None);
    }
    decode(value).map(Some)
  }

  /// Create or update; returns the stored record's id when the backend echoes one.
  pub async fn save(
    &self,
    construction: &Construction,
    use_global_loading: bool,
  ) -> Result<Option<i64>, ApiError> {
    let body = encode(construction)?;
    let response = self
      .api
      .save_data(
        "cong-trinh/luu",
        &body,
        Some(messages::CONSTRUCTION_SAVED),
        use_global_loading,
      )
      .await?;
    Ok(response.get("id").and_then(|id| id.as_i64()))
  }

  /// Delete is a GET; the backend answers with a `message` on success.
  pub async fn delete(&self, id: i64) -> Result<bool, ApiError> {
    let value = self
      .api
      .get_data(&format!("cong-trinh/xoa/{}", id), None, true)
      .await?;
    self.api.hooks().success(messages::CONSTRUCTION_DELETED);
    Ok(value.get("message").is_some_and(|m| !m.is_null()))
  }
}
