//! Live monitoring readings.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

use crate::api::types::{decode_or_default, encode, MonitoringReading, StationSample};
use crate::api::{ApiClient, ApiError};

/// Optional narrowing for the readings list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReadingFilter {
  #[serde(rename = "MaCT", skip_serializing_if = "Option::is_none")]
  pub construction_code: Option<String>,
  #[serde(rename = "tenct", skip_serializing_if = "Option::is_none")]
  pub construction_name: Option<String>,
  #[serde(rename = "loai_ct", skip_serializing_if = "Option::is_none")]
  pub construction_type_id: Option<i64>,
}

#[derive(Clone)]
pub struct MonitoringService {
  api: ApiClient,
}

impl MonitoringService {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }

  /// Latest reading per construction.
  pub async fn readings(&self, filter: &ReadingFilter) -> Result<Vec<MonitoringReading>, ApiError> {
    let params = encode(filter)?;
    let value = self
      .api
      .get_data("GiamSatSoLieu/danhsach", Some(&params), true)
      .await?;
    decode_or_default(value)
  }

  /// Station samples for one construction between `start` and `end`.
  ///
  /// The bounds are sent as plain UTC timestamps.
  pub async fn details(
    &self,
    construction_code: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<Vec<StationSample>, ApiError> {
    let params = json!({
      "ConstructionCode": construction_code,
      "StartDate": start.to_rfc3339_opts(SecondsFormat::Millis, true),
      "EndDate": end.to_rfc3339_opts(SecondsFormat::Millis, true),
    });
    let value = self
      .api
      .get_data("GiamSatSoLieu/thong-tin", Some(&params), true)
      .await?;
    decode_or_default(value)
  }
}
