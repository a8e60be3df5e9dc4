mod common;

use axum::http::{header, Method, StatusCode};
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{response_bytes, response_json, TestApp, API_KEY, BASE_ID, COLLECTION_PATH};
use inventory_gateway::config::Credentials;

fn assert_gateway_headers(headers: &axum::http::HeaderMap) {
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

#[rstest]
#[case("/?action=bogus")]
#[case("/?action=")]
#[case("/?action=READ")]
#[case("/")]
#[case("/api.php?action=list")]
#[tokio::test]
async fn unknown_actions_are_rejected(#[case] uri: &str) {
    let app = TestApp::new().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.remote)
        .await;

    let response = app.request(Method::GET, uri, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_gateway_headers(response.headers());
    assert_eq!(response_json(response).await, json!({"error": "Invalid action"}));
}

#[rstest]
#[case("/?action=status")]
#[case("/?action=bogus")]
#[case("/api.php?action=create")]
#[tokio::test]
async fn options_short_circuits_with_empty_body(#[case] uri: &str) {
    let app = TestApp::new().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.remote)
        .await;

    let response = app.request(Method::OPTIONS, uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_gateway_headers(response.headers());
    assert!(response_bytes(response).await.is_empty());
}

#[tokio::test]
async fn status_reports_missing_configuration() {
    let app = TestApp::unconfigured().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.remote)
        .await;

    let response = app.request(Method::GET, "/?action=status", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_gateway_headers(response.headers());

    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["configured"], false);
    assert_eq!(body["api_key_set"], false);
    assert_eq!(body["base_id_set"], false);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("AIRTABLE_API_KEY"));
    assert!(message.contains("AIRTABLE_BASE_ID"));
}

#[tokio::test]
async fn status_reports_lengths_never_values() {
    let app = TestApp::new().await;
    let response = app.request(Method::POST, "/api.php?action=status", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["configured"], true);
    assert_eq!(body["api_key_length"], API_KEY.len());
    assert_eq!(body["base_id_length"], BASE_ID.len());
    assert_eq!(body["http_client_available"], true);

    let rendered = body.to_string();
    assert!(!rendered.contains(API_KEY));
    assert!(!rendered.contains(BASE_ID));
}

#[tokio::test]
async fn status_reflects_partial_configuration() {
    let app = TestApp::with_credentials(Credentials::new(None, Some(BASE_ID.to_string()))).await;
    let body = response_json(app.request(Method::GET, "/?action=status", None).await).await;

    assert_eq!(body["configured"], false);
    assert_eq!(body["base_id_set"], true);
    assert_eq!(body["api_key_length"], 0);
    assert_eq!(
        body["message"],
        "Missing environment variables: AIRTABLE_API_KEY"
    );
}

#[tokio::test]
async fn malformed_body_is_treated_as_empty_object() {
    let app = TestApp::new().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/", COLLECTION_PATH)))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&app.remote)
        .await;

    let response = app
        .request_raw(Method::POST, "/?action=update", "{not json")
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response_json(response).await,
        json!({"error": "Failed to update item"})
    );
}

#[tokio::test]
async fn repeated_action_uses_last_value() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/?action=bogus&action=status", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["configured"], true);

    let response = app
        .request(Method::GET, "/?action=status&action=bogus", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn oversized_body() -> Vec<u8> {
    vec![b'x'; 3 * 1024 * 1024]
}

#[rstest]
#[case("/?action=status")]
#[case("/?action=read")]
#[tokio::test]
async fn oversized_body_is_ignored_when_not_needed(#[case] uri: &str) {
    let app = TestApp::new().await;
    Mock::given(method("GET"))
        .and(path(COLLECTION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .mount(&app.remote)
        .await;

    let response = app.request_raw(Method::POST, uri, oversized_body()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_gateway_headers(response.headers());
    assert_eq!(response_json(response).await["success"], true);
}

#[rstest]
#[case("/?action=create")]
#[case("/?action=update")]
#[case("/?action=delete")]
#[tokio::test]
async fn oversized_body_on_mutation_is_a_json_413(#[case] uri: &str) {
    let app = TestApp::new().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.remote)
        .await;

    let response = app.request_raw(Method::POST, uri, oversized_body()).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_gateway_headers(response.headers());
    assert_eq!(
        response_json(response).await,
        json!({"error": "Request body too large"})
    );
}
