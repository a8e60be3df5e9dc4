#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use inventory_gateway::{app, config::Credentials, services::HttpTableClient, AppState};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

pub const API_KEY: &str = "patTestKey.0123456789";
pub const BASE_ID: &str = "appTestBase";
pub const COLLECTION_PATH: &str = "/v0/appTestBase/Inventory";

/// Gateway router wired to a wiremock server standing in for Airtable.
pub struct TestApp {
    router: Router,
    pub remote: MockServer,
}

impl TestApp {
    /// Gateway with both credentials configured.
    pub async fn new() -> Self {
        Self::with_credentials(Credentials::new(
            Some(API_KEY.to_string()),
            Some(BASE_ID.to_string()),
        ))
        .await
    }

    /// Gateway with neither credential configured.
    pub async fn unconfigured() -> Self {
        Self::with_credentials(Credentials::default()).await
    }

    pub async fn with_credentials(credentials: Credentials) -> Self {
        let remote = MockServer::start().await;
        let router = router_for(&format!("{}/v0", remote.uri()), credentials);
        Self { router, remote }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        send(&self.router, method, uri, body).await
    }

    /// Sends `body` verbatim, without a content type.
    pub async fn request_raw(&self, method: Method, uri: &str, body: impl Into<Body>) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body.into())
            .expect("request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

/// Router whose Airtable client points at `api_url`.
pub fn router_for(api_url: &str, credentials: Credentials) -> Router {
    let client =
        HttpTableClient::new(api_url, Duration::from_secs(5)).expect("test client should build");
    app(AppState::new(credentials, Arc::new(client)))
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    router
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("router is infallible")
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes")
        .to_vec()
}
