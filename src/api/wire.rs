//! Outgoing payload encoding shared by every request.

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use serde_json::Value;

/// Offset label the backend expects on every timestamp.
pub const WIRE_OFFSET_LABEL: &str = "+07:00";

/// Rewrites UTC timestamps into the backend's wall-clock format.
///
/// The instant is shifted by the device's local offset and then labelled with
/// the fixed [`WIRE_OFFSET_LABEL`]. The label does not follow the device
/// offset; the backend depends on this exact encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateShift {
  /// Offset to shift by; `None` uses the host's local offset at that instant
  local_offset: Option<FixedOffset>,
}

impl DateShift {
  /// Shift by the host's local offset.
  pub fn local() -> Self {
    Self { local_offset: None }
  }

  /// Shift by a fixed offset regardless of the host timezone.
  pub fn fixed(offset: FixedOffset) -> Self {
    Self {
      local_offset: Some(offset),
    }
  }

  fn offset_at(&self, at: DateTime<Utc>) -> FixedOffset {
    self
      .local_offset
      .unwrap_or_else(|| Local.offset_from_utc_datetime(&at.naive_utc()).fix())
  }

  /// Encode one instant for the wire.
  pub fn format(&self, at: DateTime<Utc>) -> String {
    let shifted = at.naive_utc() + self.offset_at(at);
    format!(
      "{}{}",
      shifted.format("%Y-%m-%dT%H:%M:%S%.3f"),
      WIRE_OFFSET_LABEL
    )
  }

  /// Walk a payload and re-encode every UTC timestamp string.
  ///
  /// Serialized `DateTime<Utc>` values are the only strings that carry a
  /// trailing `Z`; everything else passes through unchanged.
  pub fn normalize(&self, value: &Value) -> Value {
    match value {
      Value::String(s) => match parse_utc_instant(s) {
        Some(at) => Value::String(self.format(at)),
        None => value.clone(),
      },
      Value::Array(items) => Value::Array(items.iter().map(|v| self.normalize(v)).collect()),
      Value::Object(map) => Value::Object(
        map
          .iter()
          .map(|(k, v)| (k.clone(), self.normalize(v)))
          .collect(),
      ),
      _ => value.clone(),
    }
  }
}

fn parse_utc_instant(s: &str) -> Option<DateTime<Utc>> {
  if !s.ends_with('Z') || !s.contains('T') {
    return None;
  }
  DateTime::parse_from_rfc3339(s)
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

/// Flatten a JSON params object into query pairs.
///
/// `null` entries are dropped, arrays repeat the key, nested objects are sent
/// as compact JSON.
pub fn query_pairs(params: &Value) -> Vec<(String, String)> {
  let Some(map) = params.as_object() else {
    return Vec::new();
  };

  let mut pairs = Vec::new();
  for (key, value) in map {
    match value {
      Value::Null => {}
      Value::Array(items) => {
        for item in items.iter().filter(|v| !v.is_null()) {
          pairs.push((key.clone(), scalar_text(item)));
        }
      }
      other => pairs.push((key.clone(), scalar_text(other))),
    }
  }
  pairs
}

fn scalar_text(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// Whether a response body counts as "no result".
///
/// Mirrors the backend contract where `null`, `false`, `0` and `""` all mean
/// nothing was produced.
pub fn is_empty_payload(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::Bool(b) => !b,
    Value::String(s) => s.is_empty(),
    Value::Number(n) => n.as_f64() == Some(0.0),
    Value::Array(_) | Value::Object(_) => false,
  }
}
