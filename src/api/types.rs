//! Serde types matching backend request and response bodies.
//!
//! Field names follow the backend's wire names through `#[serde(rename)]`.
//! Records keep unknown fields in `extra` so a fetched record can be edited
//! and saved back without losing data.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ApiError;

/// Decode a response body into a typed value.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
  serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Like [`decode`], but a `null` body yields `T::default()`.
pub fn decode_or_default<T: DeserializeOwned + Default>(value: Value) -> Result<T, ApiError> {
  if value.is_null() {
    return Ok(T::default());
  }
  decode(value)
}

/// Encode a request body.
pub fn encode<T: Serialize>(value: &T) -> Result<Value, ApiError> {
  serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

// ============================================================================
// Paging
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
  #[serde(default = "Vec::new")]
  pub items: Vec<T>,
  #[serde(default)]
  pub total_items: u64,
  #[serde(default = "default_page_number")]
  pub page_number: u32,
  #[serde(default = "default_page_size")]
  pub page_size: u32,
}

fn default_page_number() -> u32 {
  1
}

fn default_page_size() -> u32 {
  10
}

impl<T> Default for PageResponse<T> {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      total_items: 0,
      page_number: default_page_number(),
      page_size: default_page_size(),
    }
  }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
  pub user_name: String,
  pub password: String,
  pub remember_me: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub token: String,
  #[serde(default)]
  pub permissions: Vec<DashboardPerms>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPerms {
  pub dashboard_path: String,
  #[serde(default)]
  pub actions: std::collections::BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
  pub current_password: String,
  pub new_password: String,
  pub new_confirm_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionMap {
  pub path: String,
  #[serde(default)]
  pub view: bool,
  #[serde(default)]
  pub create: bool,
  #[serde(default)]
  pub edit: bool,
  #[serde(default)]
  pub delete: bool,
  #[serde(default)]
  pub approve: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPermission {
  pub dashboard_name: String,
  pub dashboard_path: String,
  pub actions: PermissionMap,
}

/// Identity claims carried in the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
  pub id: Option<String>,
  pub user_name: Option<String>,
  pub role: Option<String>,
}

// ============================================================================
// Licences
// ============================================================================

/// Licence validity bucket as understood by the backend filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
  #[serde(rename = "con-hieu-luc")]
  Valid,
  #[serde(rename = "sap-het-hieu-luc")]
  Expiring,
  #[serde(rename = "het-hieu-luc")]
  Expired,
  #[serde(rename = "da-bi-thu-hoi")]
  Revoked,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct License {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  #[serde(rename = "soGP", skip_serializing_if = "Option::is_none")]
  pub number: Option<String>,
  #[serde(rename = "tenGP", skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(rename = "idLoaiGP", skip_serializing_if = "Option::is_none")]
  pub license_type_id: Option<i64>,
  #[serde(rename = "idTCCN", skip_serializing_if = "Option::is_none")]
  pub organization_id: Option<i64>,
  #[serde(rename = "idCT", skip_serializing_if = "Option::is_none")]
  pub construction_id: Option<i64>,
  #[serde(rename = "ngayKy", skip_serializing_if = "Option::is_none")]
  pub signed_on: Option<String>,
  #[serde(rename = "ngayCoHieuLuc", skip_serializing_if = "Option::is_none")]
  pub effective_from: Option<String>,
  #[serde(rename = "ngayHetHieuLuc", skip_serializing_if = "Option::is_none")]
  pub expires_on: Option<String>,
  #[serde(rename = "coQuanCapPhep", skip_serializing_if = "Option::is_none")]
  pub issuing_authority: Option<String>,
  #[serde(rename = "hieuluc_gp", skip_serializing_if = "Option::is_none")]
  pub validity: Option<Validity>,
  #[serde(rename = "daBiThuHoi", skip_serializing_if = "Option::is_none")]
  pub revoked: Option<bool>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Licence search criteria.
#[derive(Debug, Clone, Default)]
pub struct LicenseFilter {
  pub number: Option<String>,
  pub construction_name: Option<String>,
  pub license_type_id: Option<i64>,
  pub organization_id: Option<i64>,
  pub authority: Option<String>,
  pub from_year: Option<i32>,
  pub to_year: Option<i32>,
  pub district_id: Option<i64>,
  pub commune_id: Option<i64>,
  pub construction_type_id: Option<i64>,
  pub aquifer_id: Option<i64>,
  pub subzone_id: Option<i64>,
  pub validity: Option<Validity>,
  pub page_number: Option<u32>,
  pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
struct LicenseQuery<'a> {
  so_gp: Option<&'a str>,
  cong_trinh: Option<&'a str>,
  loaihinh_cp: Option<i64>,
  tochuc_canhan: Option<i64>,
  coquan_cp: Option<&'a str>,
  tu_nam: Option<i32>,
  den_nam: Option<i32>,
  huyen: Option<i64>,
  xa: Option<i64>,
  loai_ct: Option<i64>,
  tang_chuanuoc: Option<i64>,
  tieuvung_qh: Option<i64>,
  hieuluc_gp: Option<Validity>,
  #[serde(rename = "pageNumber")]
  page_number: u32,
  #[serde(rename = "pageSize")]
  page_size: u32,
}

impl LicenseFilter {
  /// Query parameters in the backend's filter vocabulary.
  pub fn to_params(&self) -> Value {
    let query = LicenseQuery {
      so_gp: self.number.as_deref(),
      cong_trinh: self.construction_name.as_deref(),
      loaihinh_cp: self.license_type_id,
      tochuc_canhan: self.organization_id,
      coquan_cp: self.authority.as_deref(),
      tu_nam: self.from_year,
      den_nam: self.to_year,
      huyen: self.district_id,
      xa: self.commune_id,
      loai_ct: self.construction_type_id,
      tang_chuanuoc: self.aquifer_id,
      tieuvung_qh: self.subzone_id,
      hieuluc_gp: self.validity,
      page_number: self.page_number.unwrap_or(1),
      page_size: self.page_size.unwrap_or(10),
    };
    // Plain struct of scalars, serialization cannot fail
    serde_json::to_value(query).unwrap_or(Value::Null)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseStatistics {
  pub total_licenses: u64,
  pub valid_licenses: u64,
  pub expired_licenses: u64,
  pub expiring_licenses: u64,
  pub revoked_licenses: u64,
  pub pending_licenses: u64,
}

// ============================================================================
// Constructions
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Construction {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  #[serde(rename = "tenCT", skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(rename = "maCT", skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
  #[serde(rename = "idLoaiCT", skip_serializing_if = "Option::is_none")]
  pub construction_type_id: Option<i64>,
  #[serde(rename = "viTriCT", skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub x: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub y: Option<f64>,
  #[serde(rename = "nguonNuocKT", skip_serializing_if = "Option::is_none")]
  pub water_source: Option<String>,
  #[serde(rename = "namBatDauVanHanh", skip_serializing_if = "Option::is_none")]
  pub operating_since: Option<i32>,
  #[serde(rename = "taiKhoan", skip_serializing_if = "Option::is_none")]
  pub account: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConstructionFilter {
  #[serde(rename = "tenCT", skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(rename = "idLoaiCT", skip_serializing_if = "Option::is_none")]
  pub construction_type_id: Option<i64>,
  #[serde(rename = "idHuyen", skip_serializing_if = "Option::is_none")]
  pub district_id: Option<i64>,
  #[serde(rename = "idXa", skip_serializing_if = "Option::is_none")]
  pub commune_id: Option<i64>,
  #[serde(rename = "idSong", skip_serializing_if = "Option::is_none")]
  pub river_id: Option<i64>,
  #[serde(rename = "idLuuVuc", skip_serializing_if = "Option::is_none")]
  pub basin_id: Option<i64>,
  #[serde(rename = "idTieuLuuVuc", skip_serializing_if = "Option::is_none")]
  pub sub_basin_id: Option<i64>,
  #[serde(rename = "idTangChuaNuoc", skip_serializing_if = "Option::is_none")]
  pub aquifer_id: Option<i64>,
  #[serde(rename = "nguonNuocKT", skip_serializing_if = "Option::is_none")]
  pub water_source: Option<String>,
}

// ============================================================================
// Monitoring
// ============================================================================

/// Latest monitoring reading for a construction; measurements live in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringReading {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  #[serde(rename = "tenCT", skip_serializing_if = "Option::is_none")]
  pub construction_name: Option<String>,
  #[serde(rename = "maCT", skip_serializing_if = "Option::is_none")]
  pub construction_code: Option<String>,
  #[serde(rename = "thoiGian", skip_serializing_if = "Option::is_none")]
  pub recorded_at: Option<String>,
  #[serde(rename = "matKetNoi", skip_serializing_if = "Option::is_none")]
  pub disconnected: Option<i64>,
  #[serde(rename = "loi", skip_serializing_if = "Option::is_none")]
  pub faults: Option<i64>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// One station sample in a time series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSample {
  pub id: Option<i64>,
  pub construction_code: Option<String>,
  pub station_code: Option<String>,
  pub parameter_name: Option<String>,
  pub value: Option<f64>,
  pub unit: Option<String>,
  pub time: Option<String>,
  pub device_status: Option<i64>,
  pub status: Option<bool>,
}

// ============================================================================
// Organisations and data-transmission accounts
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Organization {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  #[serde(rename = "tenTCCN", skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(rename = "diaChi", skip_serializing_if = "Option::is_none")]
  pub address: Option<String>,
  #[serde(rename = "maSoThue", skip_serializing_if = "Option::is_none")]
  pub tax_code: Option<String>,
  #[serde(rename = "sdt", skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(rename = "taiKhoan", skip_serializing_if = "Option::is_none")]
  pub account: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmissionAccount {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub password: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ftp_address: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub protocol: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub port: Option<u16>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub working_directory: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<bool>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}
