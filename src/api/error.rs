use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use super::messages;

/// Errors that can occur when talking to the backend.
///
/// Every variant resolves to a single user-facing message via [`ApiError::message`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
  /// The error body carried an explicit `message` or `title`
  #[error("{message}")]
  ServerMessage { status: StatusCode, message: String },

  /// HTTP 401, the caller is expected to send the user back to login
  #[error("Unauthorized")]
  Unauthorized,

  /// HTTP 403
  #[error("Forbidden")]
  Forbidden,

  /// HTTP 404
  #[error("Resource not found")]
  NotFound,

  /// HTTP 5xx
  #[error("Server error ({0})")]
  Server(StatusCode),

  /// No response was received at all
  #[error("Connection error: {0}")]
  Connection(String),

  /// Any other non-success status
  #[error("Unexpected status ({0})")]
  Unexpected(StatusCode),

  /// A successful response did not have the expected shape
  #[error("Failed to decode response: {0}")]
  Decode(String),

  /// The local store could not be read or written
  #[error("Storage error: {0}")]
  Storage(String),
}

impl ApiError {
  /// Classify a received error response. First match wins.
  pub fn from_response(status: StatusCode, body: &str) -> Self {
    if let Some(message) = declared_message(body) {
      return Self::ServerMessage { status, message };
    }

    match status {
      StatusCode::UNAUTHORIZED => Self::Unauthorized,
      StatusCode::FORBIDDEN => Self::Forbidden,
      StatusCode::NOT_FOUND => Self::NotFound,
      s if s.is_server_error() => Self::Server(s),
      s => Self::Unexpected(s),
    }
  }

  /// Classify a transport failure (no response received).
  pub fn from_transport(err: &reqwest::Error) -> Self {
    Self::Connection(err.to_string())
  }

  /// The text shown to the user for this failure.
  pub fn message(&self) -> &str {
    match self {
      Self::ServerMessage { message, .. } => message,
      Self::Unauthorized => messages::SESSION_EXPIRED,
      Self::Forbidden => messages::FORBIDDEN,
      Self::NotFound => messages::NOT_FOUND,
      Self::Server(_) => messages::SERVER_ERROR,
      Self::Connection(_) => messages::CONNECTION_ERROR,
      Self::Unexpected(_) | Self::Decode(_) | Self::Storage(_) => messages::GENERIC_ERROR,
    }
  }

  /// Whether this failure produces an on-screen notification.
  ///
  /// Any 401 is suppressed, whatever its body says; a redirect to login
  /// follows instead.
  pub fn is_notified(&self) -> bool {
    self.status() != Some(StatusCode::UNAUTHORIZED)
  }

  /// HTTP status of the failed exchange, if a response was received.
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::ServerMessage { status, .. } | Self::Server(status) | Self::Unexpected(status) => {
        Some(*status)
      }
      Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
      Self::Forbidden => Some(StatusCode::FORBIDDEN),
      Self::NotFound => Some(StatusCode::NOT_FOUND),
      Self::Connection(_) | Self::Decode(_) | Self::Storage(_) => None,
    }
  }
}

/// Pull a server-declared `message` (or `title`) out of an error body.
fn declared_message(body: &str) -> Option<String> {
  let value: Value = serde_json::from_str(body).ok()?;
  let obj = value.as_object()?;

  ["message", "title"].iter().find_map(|field| {
    obj
      .get(*field)
      .and_then(Value::as_str)
      .filter(|s| !s.is_empty())
      .map(String::from)
  })
}
