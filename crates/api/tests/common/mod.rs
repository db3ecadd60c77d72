//! Common test utilities for integration tests.

// Allow dead code in this module - these are helper utilities that may not be
// used by all integration tests but are intentionally available for future use.
#![allow(dead_code)]

use axum::Router;
use trinetra_api::{
    app::create_app,
    config::{
        AntiTheftConfig, Config, LimitsConfig, LoggingConfig, SecurityConfig, ServerConfig,
        SosConfig,
    },
};

/// Test configuration with fast timeouts and rate limiting disabled.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Use random port
            request_timeout_secs: 30,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            command_rate_limit_per_minute: 0, // Disable rate limiting for tests
        },
        limits: LimitsConfig {
            max_geofences_per_user: 50,
            max_sos_contacts: 20,
            max_message_length: 500,
        },
        anti_theft: AntiTheftConfig {
            wipe_secret: "TEST-WIPE-SECRET".to_string(),
            play_sound_timeout_ms: 100,
        },
        sos: SosConfig {
            provider: "console".to_string(),
            per_contact_timeout_ms: 100,
            sms_gateway_url: String::new(),
            email_gateway_url: String::new(),
        },
    }
}

/// Create a test application router.
pub fn create_test_app(config: Config) -> Router {
    create_app(config)
}

/// Generate a unique user id for testing.
pub fn unique_user_id() -> String {
    format!("user-{}", uuid::Uuid::new_v4().simple())
}

/// Generate a unique device id for testing.
pub fn unique_device_id() -> String {
    format!("device-{}", uuid::Uuid::new_v4().simple())
}

/// Build a JSON request.
pub fn json_request(
    method: axum::http::Method,
    uri: &str,
    body: serde_json::Value,
) -> axum::http::Request<axum::body::Body> {
    use axum::{
        body::Body,
        http::{header, Request},
    };

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a GET request.
pub fn get_request(uri: &str) -> axum::http::Request<axum::body::Body> {
    use axum::{
        body::Body,
        http::{Method, Request},
    };

    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a DELETE request.
pub fn delete_request(uri: &str) -> axum::http::Request<axum::body::Body> {
    use axum::{
        body::Body,
        http::{Method, Request},
    };

    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
