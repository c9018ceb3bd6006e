//! Shared helpers for the WireMock integration tests.

#![allow(dead_code)]

use google_analytics_integration::{analytics_config, AnalyticsConfig, Endpoints};
use std::collections::HashMap;
use std::path::PathBuf;
use wiremock::{MockServer, Request};

pub const CLIENT_ID: &str = "1234.apps.googleusercontent.com";
pub const SERVICE_EMAIL: &str = "reporting-test@example.iam.gserviceaccount.com";

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Every endpoint pointed at the mock server.
pub fn endpoints(server: &MockServer) -> Endpoints {
    Endpoints::with_base_url(&server.uri())
}

pub fn config(server: &MockServer, account_id: &str) -> AnalyticsConfig {
    analytics_config()
        .base_url(&server.uri())
        .account_id(account_id)
        .build()
        .expect("valid configuration")
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Decoded form body of a captured request.
pub fn form_body(request: &Request) -> HashMap<String, String> {
    url::form_urlencoded::parse(&request.body).into_owned().collect()
}

/// Decoded query string of a captured request.
pub fn query(request: &Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

pub async fn last_request(server: &MockServer) -> Request {
    server
        .received_requests()
        .await
        .and_then(|requests| requests.last().cloned())
        .expect("a request was received")
}
