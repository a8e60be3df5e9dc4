//! Inventory Gateway
//!
//! A stateless HTTP proxy in front of an Airtable "Inventory" table. Clients select an
//! operation with `?action=status|read|create|update|delete`; each request becomes at most
//! one outbound Airtable call and a reshaped JSON response.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod tracing;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::any,
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Credentials;
use crate::services::TableClient;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<Credentials>,
    pub table: Arc<dyn TableClient>,
}

impl AppState {
    pub fn new(credentials: Credentials, table: Arc<dyn TableClient>) -> Self {
        Self {
            credentials: Arc::new(credentials),
            table,
        }
    }
}

/// Builds the gateway router.
///
/// The dispatcher is mounted on `/` and on `/api.php`, the path existing clients call.
/// Every response carries a JSON content type and permissive CORS headers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", any(handlers::dispatch))
        .route("/api.php", any(handlers::dispatch))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(crate::tracing::configure_http_tracing())
        .with_state(state)
}
