// SPDX-License-Identifier: MIT

use std::sync::Arc;

use subfront::config::Config;
use subfront::routes::create_router;
use subfront::AppState;

/// Create a test app from the given config.
#[allow(dead_code)]
pub fn create_test_app(config: Config) -> axum::Router {
    let state = Arc::new(AppState::new(config).expect("Failed to build test state"));
    create_router(state)
}

/// Create a test app with both downstream base URLs pointed at `url`
/// (Supabase paths and Kill Bill paths never collide, so one mock server
/// can play both).
#[allow(dead_code)]
pub fn app_with_downstream(url: &str) -> axum::Router {
    let mut config = Config::test_default();
    config.supabase_url = url.to_string();
    config.killbill_url = url.to_string();
    create_test_app(config)
}

/// Create a test app whose downstream URLs point at a closed port, so any
/// accidental downstream call fails loudly (as `INTERNAL_ERROR`/503 instead
/// of the expected validation code).
#[allow(dead_code)]
pub fn app_without_downstream() -> axum::Router {
    app_with_downstream("http://127.0.0.1:1")
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body was not JSON")
}

/// Collect a response body as raw bytes.
#[allow(dead_code)]
pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}
