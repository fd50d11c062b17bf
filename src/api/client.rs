use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;

use super::error::ApiError;
use super::hooks::ApiHooks;
use super::messages;
use super::session::SessionStore;
use super::types::decode;
use super::wire::{is_empty_payload, query_pairs, DateShift};

/// Transport overrides for a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
  /// Extra headers; these replace defaults with the same name
  pub headers: Vec<(String, String)>,
  /// Query parameters, sent as-is
  pub params: Option<Value>,
}

impl RequestOptions {
  pub fn with_params(params: Option<&Value>) -> Self {
    Self {
      params: params.filter(|p| !p.is_null()).cloned(),
      ..Default::default()
    }
  }
}

/// REST client for the monitoring backend.
///
/// Every call goes through [`ApiClient::perform_request`], which attaches the
/// bearer token, re-encodes dates, drives the loading indicator and funnels
/// failures into a single notification.
#[derive(Clone)]
pub struct ApiClient {
  http: Client,
  base_url: Url,
  session: SessionStore,
  hooks: ApiHooks,
  dates: DateShift,
}

impl ApiClient {
  /// Create a client against `base_url` with no request timeout.
  pub fn new(base_url: &str, session: SessionStore, hooks: ApiHooks) -> Result<Self, ApiError> {
    Self::build(base_url, None, session, hooks)
  }

  /// Create a client from the loaded configuration.
  pub fn from_config(
    config: &Config,
    session: SessionStore,
    hooks: ApiHooks,
  ) -> Result<Self, ApiError> {
    let timeout = config.api.timeout_secs.map(Duration::from_secs);
    let client = Self::build(&config.api.base_url, timeout, session, hooks)?;
    Ok(client.with_date_shift(config.date_shift()))
  }

  fn build(
    base_url: &str,
    timeout: Option<Duration>,
    session: SessionStore,
    hooks: ApiHooks,
  ) -> Result<Self, ApiError> {
    // Url::join drops the last path segment unless the base ends with '/'
    let normalized = format!("{}/", base_url.trim_end_matches('/'));
    let base_url = Url::parse(&normalized)
      .map_err(|e| ApiError::Connection(format!("Invalid base URL {}: {}", base_url, e)))?;

    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    let http = builder
      .build()
      .map_err(|e| ApiError::Connection(format!("Failed to build HTTP client: {}", e)))?;

    Ok(Self {
      http,
      base_url,
      session,
      hooks,
      dates: DateShift::local(),
    })
  }

  /// Override how outgoing dates are shifted.
  pub fn with_date_shift(mut self, dates: DateShift) -> Self {
    self.dates = dates;
    self
  }

  pub fn session(&self) -> &SessionStore {
    &self.session
  }

  pub fn hooks(&self) -> &ApiHooks {
    &self.hooks
  }

  /// Resolve a relative endpoint against the base URL.
  pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
    self
      .base_url
      .join(endpoint.trim_start_matches('/'))
      .map_err(|e| ApiError::Connection(format!("Invalid endpoint {}: {}", endpoint, e)))
  }

  /// Perform one HTTP call.
  ///
  /// For POST/PUT/PATCH `body` is sent as JSON. For other methods a `body`
  /// is used as query parameters unless `options.params` is set. Dates in
  /// `body` are re-encoded; `options.params` is sent untouched.
  ///
  /// Failures are reported through the notifier before being returned.
  pub async fn perform_request(
    &self,
    method: Method,
    endpoint: &str,
    body: Option<&Value>,
    options: RequestOptions,
    use_global_loading: bool,
  ) -> Result<Value, ApiError> {
    let _loading = use_global_loading.then(|| self.hooks.loading.begin());
    let result = self.execute(method.clone(), endpoint, body, &options).await;
    self.finish(&method, endpoint, result)
  }

  /// Build and send one call without touching the loading indicator or the
  /// notifier. Callers that report their own outcome use this directly.
  pub async fn execute(
    &self,
    method: Method,
    endpoint: &str,
    body: Option<&Value>,
    options: &RequestOptions,
  ) -> Result<Value, ApiError> {
    let request = self.build_request(method, endpoint, body, options)?;
    self.send(request).await
  }

  fn build_request(
    &self,
    method: Method,
    endpoint: &str,
    body: Option<&Value>,
    options: &RequestOptions,
  ) -> Result<RequestBuilder, ApiError> {
    let url = self.endpoint_url(endpoint)?;
    let mut request = self
      .http
      .request(method.clone(), url)
      .headers(self.headers(&options.headers));

    let sends_body = matches!(method, Method::POST | Method::PUT | Method::PATCH);
    match body.filter(|b| !b.is_null()) {
      Some(body) if sends_body => {
        request = request.json(&self.dates.normalize(body));
      }
      Some(body) if options.params.is_none() => {
        request = request.query(&query_pairs(&self.dates.normalize(body)));
      }
      _ => {}
    }

    if let Some(params) = &options.params {
      request = request.query(&query_pairs(params));
    }

    Ok(request)
  }

  fn headers(&self, extra: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let authorization = HeaderValue::from_str(&self.session.authorization()).unwrap_or_else(|_| {
      warn!("Session token is not a valid header value, sending empty");
      HeaderValue::from_static("")
    });
    headers.insert(AUTHORIZATION, authorization);

    for (name, value) in extra {
      match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
      ) {
        (Ok(name), Ok(value)) => {
          headers.insert(name, value);
        }
        _ => warn!("Skipping invalid header {}", name),
      }
    }

    headers
  }

  async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
    let response = request
      .send()
      .await
      .map_err(|e| ApiError::from_transport(&e))?;

    let status = response.status();
    let text = response
      .text()
      .await
      .map_err(|e| ApiError::from_transport(&e))?;

    if !status.is_success() {
      return Err(ApiError::from_response(status, &text));
    }

    Ok(parse_body(&text))
  }

  /// Single exit point: log and notify failures.
  fn finish(
    &self,
    method: &Method,
    endpoint: &str,
    result: Result<Value, ApiError>,
  ) -> Result<Value, ApiError> {
    match &result {
      Ok(_) => debug!(%method, endpoint, "Request succeeded"),
      Err(err) => {
        warn!(%method, endpoint, status = ?err.status(), "Request failed: {}", err);
        if err.is_notified() {
          self.hooks.error(err.message());
        }
      }
    }
    result
  }

  /// GET with optional query parameters.
  pub async fn get_data(
    &self,
    endpoint: &str,
    params: Option<&Value>,
    use_global_loading: bool,
  ) -> Result<Value, ApiError> {
    self
      .perform_request(
        Method::GET,
        endpoint,
        None,
        RequestOptions::with_params(params),
        use_global_loading,
      )
      .await
  }

  /// GET and decode into `T`.
  pub async fn get_as<T: DeserializeOwned>(
    &self,
    endpoint: &str,
    params: Option<&Value>,
    use_global_loading: bool,
  ) -> Result<T, ApiError> {
    let value = self.get_data(endpoint, params, use_global_loading).await?;
    decode(value)
  }

  /// POST a new record.
  pub async fn save_data(
    &self,
    endpoint: &str,
    data: &Value,
    success_message: Option<&str>,
    use_global_loading: bool,
  ) -> Result<Value, ApiError> {
    let response = self
      .perform_request(
        Method::POST,
        endpoint,
        Some(data),
        RequestOptions::default(),
        use_global_loading,
      )
      .await?;
    self.announce(&response, success_message, messages::CREATE_SUCCESS);
    Ok(response)
  }

  /// PUT an existing record.
  pub async fn update_data(
    &self,
    endpoint: &str,
    data: &Value,
    success_message: Option<&str>,
    use_global_loading: bool,
  ) -> Result<Value, ApiError> {
    let response = self
      .perform_request(
        Method::PUT,
        endpoint,
        Some(data),
        RequestOptions::default(),
        use_global_loading,
      )
      .await?;
    self.announce(&response, success_message, messages::UPDATE_SUCCESS);
    Ok(response)
  }

  /// DELETE a record.
  pub async fn delete_data(
    &self,
    endpoint: &str,
    success_message: Option<&str>,
    use_global_loading: bool,
  ) -> Result<Value, ApiError> {
    let response = self
      .perform_request(
        Method::DELETE,
        endpoint,
        None,
        RequestOptions::default(),
        use_global_loading,
      )
      .await?;
    self.announce(&response, success_message, messages::DELETE_SUCCESS);
    Ok(response)
  }

  /// Upload a file to `file/upload` as multipart form data.
  ///
  /// `file_path` is the target folder on the server; `target_name` defaults
  /// to `file_name`.
  pub async fn upload_file(
    &self,
    contents: Vec<u8>,
    file_name: &str,
    file_path: &str,
    target_name: Option<&str>,
    use_global_loading: bool,
  ) -> Result<Value, ApiError> {
    let _loading = use_global_loading.then(|| self.hooks.loading.begin());
    let endpoint = "file/upload";

    let form = Form::new()
      .part("File", Part::bytes(contents).file_name(file_name.to_string()))
      .text("FilePath", file_path.to_string())
      .text("FileName", target_name.unwrap_or(file_name).to_string());

    let result = match self.endpoint_url(endpoint) {
      Ok(url) => {
        let request = self
          .http
          .post(url)
          .headers(self.headers(&[]))
          .multipart(form);
        self.send(request).await
      }
      Err(e) => Err(e),
    };

    let response = self.finish(&Method::POST, endpoint, result)?;
    self.announce(&response, None, messages::UPLOAD_SUCCESS);
    Ok(response)
  }

  fn announce(&self, response: &Value, message: Option<&str>, default: &str) {
    if !is_empty_payload(response) {
      self.hooks.success(message.unwrap_or(default));
    }
  }
}

/// Parse a success body: JSON when possible, raw text otherwise.
fn parse_body(text: &str) -> Value {
  if text.trim().is_empty() {
    return Value::Null;
  }
  serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
