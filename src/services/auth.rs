//! Session lifecycle: login, logout and identity from the bearer token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::messages;
use crate::api::types::{
  decode, decode_or_default, encode, DashboardPermission, LoginRequest, LoginResponse,
  PasswordChange, UserInfo,
};
use crate::api::{ApiClient, ApiError, RequestOptions};

/// Claims read from the token payload. The signature is not checked.
#[derive(Debug, Deserialize)]
struct Claims {
  /// String or number depending on the issuer
  id: Option<Value>,
  #[serde(rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name")]
  name: Option<String>,
  #[serde(rename = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role")]
  role: Option<String>,
  exp: Option<i64>,
}

fn decode_claims(token: &str) -> Option<Claims> {
  let payload = token.split('.').nth(1)?;
  let bytes = URL_SAFE_NO_PAD
    .decode(payload.trim_end_matches('='))
    .ok()?;
  serde_json::from_slice(&bytes).ok()
}

/// Message to show for a failed session call.
fn failure_message<'a>(err: &'a ApiError, fallback: &'a str) -> &'a str {
  match err {
    ApiError::ServerMessage { message, .. } => message,
    _ => fallback,
  }
}

#[derive(Clone)]
pub struct AuthService {
  api: ApiClient,
}

impl AuthService {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }

  /// Exchange credentials for a token and store it.
  ///
  /// The response is returned as-is; a token is only stored when the backend
  /// reports success.
  pub async fn login(
    &self,
    user_name: &str,
    password: &str,
    remember_me: bool,
  ) -> Result<LoginResponse, ApiError> {
    let body = encode(&LoginRequest {
      user_name: user_name.to_string(),
      password: password.to_string(),
      remember_me,
    })?;

    let hooks = self.api.hooks();
    let _loading = hooks.loading.begin();
    let result = self
      .api
      .execute(
        Method::POST,
        "auth/login",
        Some(&body),
        &RequestOptions::default(),
      )
      .await
      .and_then(decode_or_default::<LoginResponse>);

    let response = match result {
      Ok(response) => response,
      Err(e) => {
        warn!(user_name, "Login failed: {}", e);
        hooks.error(failure_message(&e, messages::LOGIN_ERROR));
        return Err(e);
      }
    };

    if response.success && !response.token.is_empty() {
      if let Err(e) = self.api.session().set_token(&response.token) {
        warn!("Failed to store session token: {}", e);
        hooks.error(messages::LOGIN_ERROR);
        return Err(ApiError::Storage(e.to_string()));
      }
      info!(user_name, "Logged in");
      hooks.success(messages::LOGIN_SUCCESS);
    }

    Ok(response)
  }

  /// End the session. The stored token is dropped even when the call fails.
  pub async fn logout(&self) -> Result<(), ApiError> {
    let result = self
      .api
      .execute(
        Method::POST,
        "auth/logout",
        Some(&json!({})),
        &RequestOptions::default(),
      )
      .await;

    if let Err(e) = self.api.session().clear() {
      warn!("Failed to remove session token: {}", e);
    }

    match result {
      Ok(_) => {
        info!("Logged out");
        self.api.hooks().success(messages::LOGOUT_SUCCESS);
        Ok(())
      }
      Err(e) => {
        warn!("Logout call failed: {}", e);
        Err(e)
      }
    }
  }

  /// A token is stored and, if it carries an expiry, it lies in the future.
  pub fn is_authenticated(&self) -> bool {
    self.is_authenticated_at(Utc::now())
  }

  pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
    let Some(token) = self.api.session().token() else {
      return false;
    };
    match decode_claims(&token).and_then(|c| c.exp) {
      Some(exp) => exp > now.timestamp(),
      None => true,
    }
  }

  /// Identity claims of the stored token, if any.
  pub fn current_user(&self) -> Option<UserInfo> {
    let token = self.api.session().token()?;
    let claims = decode_claims(&token)?;
    Some(UserInfo {
      id: claims.id.map(|id| match id {
        Value::String(s) => s,
        other => other.to_string(),
      }),
      user_name: claims.name,
      role: claims.role,
    })
  }

  pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
    let body = encode(change)?;
    let hooks = self.api.hooks();
    let _loading = hooks.loading.begin();

    match self
      .api
      .execute(
        Method::PUT,
        "auth/password",
        Some(&body),
        &RequestOptions::default(),
      )
      .await
    {
      Ok(_) => {
        hooks.success(messages::PASSWORD_CHANGE_SUCCESS);
        Ok(())
      }
      Err(e) => {
        hooks.error(failure_message(&e, messages::PASSWORD_CHANGE_ERROR));
        Err(e)
      }
    }
  }

  /// Dashboard permissions of the logged-in user.
  pub async fn current_user_permissions(&self) -> Result<Vec<DashboardPermission>, ApiError> {
    let value: Value = self
      .api
      .execute(
        Method::GET,
        "auth/user-permissions",
        None,
        &RequestOptions::default(),
      )
      .await?;
    if value.is_null() {
      return Ok(Vec::new());
    }
    decode(value)
  }
}
