// Common test utilities and helpers

use axum::{Router, body::Body, http::Request, response::Response};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::LocaleConfig;
use crate::middleware::{LocaleCallback, NamedMethods};
use crate::{AppState, build_router};

/// Locale config with an explicit locale list and default options otherwise
pub fn locale_config(locales: &[&str]) -> LocaleConfig {
    LocaleConfig {
        locales: locales.iter().map(|s| s.to_string()).collect(),
        ..LocaleConfig::default()
    }
}

/// Build the application router for a locale config
pub fn create_test_app(config: &LocaleConfig) -> Router {
    create_test_app_with_callback(config, None)
}

pub fn create_test_app_with_callback(
    config: &LocaleConfig,
    callback: Option<LocaleCallback>,
) -> Router {
    let state = AppState::new(config, callback, &NamedMethods::new())
        .expect("Failed to build locale state");
    build_router(Arc::new(state))
}

pub fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

/// Send a request through the router
pub async fn send(app: Router, request: axum::http::request::Builder) -> Response {
    app.oneshot(request.body(Body::empty()).expect("Failed to build request"))
        .await
        .expect("Router is infallible")
}

/// Read a JSON response body
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
