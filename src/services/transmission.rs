//! Data-transmission accounts used by stations to push readings.

use serde_json::Value;

use crate::api::messages;
use crate::api::types::{decode, decode_or_default, encode, TransmissionAccount};
use crate::api::{ApiClient, ApiError};

#[derive(Clone)]
pub struct TransmissionService {
  api: ApiClient,
}

impl TransmissionService {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }

  pub async fn list(&self) -> Result<Vec<TransmissionAccount>, ApiError> {
    self.list_at("tai-khoan-ket-noi/danh-sach").await
  }

  /// Accounts visible to the caller's role.
  pub async fn list_for_role(&self) -> Result<Vec<TransmissionAccount>, ApiError> {
    self.list_at("tai-khoan-ket-noi/theo-quyen").await
  }

  /// The logged-in user's own account.
  pub async fn mine(&self) -> Result<Option<TransmissionAccount>, ApiError> {
    let value = self
      .api
      .get_data("tai-khoan-ket-noi/tai-khoan", None, true)
      .await?;
    if value.is_null() {
      return Ok(None);
    }
    decode(value).map(Some)
  }

  /// Create or update. Returns the record id, `1` when the backend only
  /// answers with a message, `0` otherwise.
  pub async fn save(&self, account: &TransmissionAccount) -> Result<i64, ApiError> {
    let body = encode(account)?;
    let response = self
      .api
      .save_data("tai-khoan-ket-noi/luu", &body, None, true)
      .await?;
    Ok(saved_id(&response))
  }

  pub async fn activate(&self, id: i64) -> Result<bool, ApiError> {
    self
      .toggle(
        &format!("tai-khoan-ket-noi/duyet/{}", id),
        messages::ACCOUNT_ACTIVATED,
      )
      .await
  }

  pub async fn deactivate(&self, id: i64) -> Result<bool, ApiError> {
    self
      .toggle(
        &format!("tai-khoan-ket-noi/huy-duyet/{}", id),
        messages::ACCOUNT_DEACTIVATED,
      )
      .await
  }

  async fn list_at(&self, endpoint: &str) -> Result<Vec<TransmissionAccount>, ApiError> {
    let value = self.api.get_data(endpoint, None, true).await?;
    decode_or_default(value)
  }

  async fn toggle(&self, endpoint: &str, message: &str) -> Result<bool, ApiError> {
    let value = self.api.get_data(endpoint, None, true).await?;
    self.api.hooks().success(message);
    Ok(value.get("success") == Some(&Value::Bool(true)))
  }
}

fn saved_id(response: &Value) -> i64 {
  match response.get("id").and_then(Value::as_i64) {
    Some(id) if id != 0 => id,
    _ if response.get("message").is_some_and(|m| !m.is_null()) => 1,
    _ => 0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_saved_id() {
    assert_eq!(saved_id(&json!({ "id": 42 })), 42);
    assert_eq!(saved_id(&json!({ "message": "ok" })), 1);
    assert_eq!(saved_id(&json!({})), 0);
    assert_eq!(saved_id(&Value::Null), 0);
  }
}
