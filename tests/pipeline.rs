//! Request pipeline against a mock backend.

mod common;

use mockito::{Matcher, Server};
use reqwest::Method;
use serde_json::json;

use common::Harness;
use wrmc::api::messages;
use wrmc::api::{ApiError, RequestOptions};

#[tokio::test]
async fn test_bearer_token_is_attached() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("GET", "/loai-ct/danh-sach")
    .match_header("authorization", "Bearer abc")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(r#"[{"id":1}]"#)
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  h.login_as("abc");

  let value = h.api.get_data("loai-ct/danh-sach", None, true).await.unwrap();

  assert_eq!(value, json!([{ "id": 1 }]));
  mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_authorization_without_token() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("GET", "/Song/danh-sach")
    .match_header("authorization", Matcher::Exact(String::new()))
    .with_status(200)
    .with_body("[]")
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  h.api.get_data("Song/danh-sach", None, false).await.unwrap();

  mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_notifies_once() {
  let mut server = Server::new_async().await;
  server
    .mock("GET", "/giay-phep/99")
    .with_status(404)
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  let err = h.api.get_data("giay-phep/99", None, true).await.unwrap_err();

  assert_eq!(err, ApiError::NotFound);
  assert_eq!(h.notifier.errors(), vec![messages::NOT_FOUND.to_string()]);
}

#[tokio::test]
async fn test_declared_message_wins_over_status() {
  let mut server = Server::new_async().await;
  server
    .mock("POST", "/giay-phep/luu")
    .with_status(500)
    .with_body(r#"{"message":"Số giấy phép đã tồn tại"}"#)
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  let err = h
    .api
    .save_data("giay-phep/luu", &json!({ "soGP": "1" }), None, true)
    .await
    .unwrap_err();

  assert_eq!(err.message(), "Số giấy phép đã tồn tại");
  assert_eq!(
    h.notifier.errors(),
    vec!["Số giấy phép đã tồn tại".to_string()]
  );
  assert!(h.notifier.successes().is_empty());
}

#[tokio::test]
async fn test_unauthorized_is_not_notified() {
  let mut server = Server::new_async().await;
  server
    .mock("GET", "/cong-trinh/danh-sach")
    .with_status(401)
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  let err = h
    .api
    .get_data("cong-trinh/danh-sach", None, true)
    .await
    .unwrap_err();

  assert_eq!(err, ApiError::Unauthorized);
  assert!(h.notifier.events().is_empty());
}

#[tokio::test]
async fn test_unauthorized_with_message_is_not_notified() {
  let mut server = Server::new_async().await;
  server
    .mock("GET", "/cong-trinh/danh-sach")
    .with_status(401)
    .with_body(r#"{"message":"Token expired"}"#)
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  let err = h
    .api
    .get_data("cong-trinh/danh-sach", None, true)
    .await
    .unwrap_err();

  assert_eq!(err.message(), "Token expired");
  assert!(h.notifier.events().is_empty());
  assert_eq!(h.api.hooks().loading.in_flight(), 0);
}

#[tokio::test]
async fn test_server_error_and_forbidden_messages() {
  let mut server = Server::new_async().await;
  server
    .mock("GET", "/a")
    .with_status(503)
    .create_async()
    .await;
  server
    .mock("GET", "/b")
    .with_status(403)
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  let _ = h.api.get_data("a", None, false).await;
  let _ = h.api.get_data("b", None, false).await;

  assert_eq!(
    h.notifier.errors(),
    vec![
      messages::SERVER_ERROR.to_string(),
      messages::FORBIDDEN.to_string()
    ]
  );
}

#[tokio::test]
async fn test_connection_failure() {
  // Nothing listens on port 1
  let h = Harness::new("http://127.0.0.1:1");
  let err = h.api.get_data("Song/danh-sach", None, true).await.unwrap_err();

  assert!(matches!(err, ApiError::Connection(_)));
  assert_eq!(
    h.notifier.errors(),
    vec![messages::CONNECTION_ERROR.to_string()]
  );
  assert_eq!(h.api.hooks().loading.in_flight(), 0);
}

#[tokio::test]
async fn test_dates_in_body_are_reencoded() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/giay-phep/luu")
    .match_body(Matcher::Json(json!({
      "soGP": "12/GP",
      "ngayKy": "2024-03-01T17:00:00.000+07:00",
      "files": [{ "uploadedAt": "2024-03-02T01:30:00.000+07:00" }],
      "note": "Z"
    })))
    .with_status(200)
    .with_body(r#"{"id":5}"#)
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  let body = json!({
    "soGP": "12/GP",
    "ngayKy": common::utc("2024-03-01T17:00:00Z"),
    "files": [{ "uploadedAt": common::utc("2024-03-02T01:30:00Z") }],
    "note": "Z"
  });
  let response = h
    .api
    .save_data("giay-phep/luu", &body, None, true)
    .await
    .unwrap();

  assert_eq!(response["id"], 5);
  assert_eq!(h.notifier.successes(), vec![messages::CREATE_SUCCESS.to_string()]);
  mock.assert_async().await;
}

#[tokio::test]
async fn test_query_params_are_sent_untouched() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("GET", "/GiamSatSoLieu/thong-tin")
    .match_query(Matcher::AllOf(vec![
      Matcher::UrlEncoded("ConstructionCode".into(), "CT01".into()),
      Matcher::UrlEncoded("StartDate".into(), "2024-01-01T00:00:00.000Z".into()),
    ]))
    .with_status(200)
    .with_body("[]")
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  let params = json!({
    "ConstructionCode": "CT01",
    "StartDate": "2024-01-01T00:00:00.000Z",
    "EndDate": null
  });
  h.api
    .get_data("GiamSatSoLieu/thong-tin", Some(&params), true)
    .await
    .unwrap();

  mock.assert_async().await;
}

#[tokio::test]
async fn test_extra_headers_override_defaults() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("GET", "/x")
    .match_header("authorization", "Basic other")
    .match_header("x-trace", "1")
    .with_status(200)
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  h.login_as("abc");
  let options = RequestOptions {
    headers: vec![
      ("Authorization".into(), "Basic other".into()),
      ("X-Trace".into(), "1".into()),
    ],
    params: None,
  };
  let value = h
    .api
    .perform_request(Method::GET, "x", None, options, false)
    .await
    .unwrap();

  assert!(value.is_null());
  mock.assert_async().await;
}

#[tokio::test]
async fn test_loading_indicator_brackets_request() {
  let mut server = Server::new_async().await;
  server
    .mock("GET", "/ok")
    .with_status(200)
    .with_body("[]")
    .create_async()
    .await;
  server
    .mock("GET", "/fail")
    .with_status(500)
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  h.api.get_data("ok", None, true).await.unwrap();
  let _ = h.api.get_data("fail", None, true).await;
  h.api.get_data("ok", None, false).await.unwrap();

  assert_eq!(h.sink.transitions(), vec![true, false, true, false]);
  assert_eq!(h.api.hooks().loading.in_flight(), 0);
}

#[tokio::test]
async fn test_empty_mutation_response_is_not_announced() {
  let mut server = Server::new_async().await;
  server
    .mock("DELETE", "/to-chuc-ca-nhan/3")
    .with_status(200)
    .with_body("null")
    .create_async()
    .await;
  server
    .mock("PUT", "/to-chuc-ca-nhan/3")
    .with_status(200)
    .with_body("true")
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  h.api
    .delete_data("to-chuc-ca-nhan/3", None, true)
    .await
    .unwrap();
  h.api
    .update_data("to-chuc-ca-nhan/3", &json!({ "id": 3 }), Some("Đã lưu"), true)
    .await
    .unwrap();

  assert_eq!(h.notifier.successes(), vec!["Đã lưu".to_string()]);
}

#[tokio::test]
async fn test_upload_sends_multipart_form() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/file/upload")
    .match_header("authorization", "Bearer abc")
    .match_header(
      "content-type",
      Matcher::Regex("^multipart/form-data".into()),
    )
    .match_body(Matcher::Regex("name=\"FilePath\"".into()))
    .with_status(200)
    .with_body(r#"{"path":"giay-phep/a.pdf"}"#)
    .create_async()
    .await;

  let h = Harness::new(&server.url());
  h.login_as("abc");
  let response = h
    .api
    .upload_file(b"%PDF".to_vec(), "a.pdf", "giay-phep", None, true)
    .await
    .unwrap();

  assert_eq!(response["path"], "giay-phep/a.pdf");
  assert_eq!(h.notifier.successes(), vec![messages::UPLOAD_SUCCESS.to_string()]);
  mock.assert_async().await;
}
