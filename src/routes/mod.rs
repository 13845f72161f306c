// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod auth;
pub mod plans;
pub mod subscriptions;

use crate::AppState;
use axum::http::{header, HeaderMap, Method};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Unmatched routes return the same structured error shape as everything else.
async fn not_found() -> crate::error::AppError {
    crate::error::AppError::NotFound
}

/// The incoming request's own origin, reconstructed from the Host header.
///
/// Used as the Supabase base URL when none is configured (locally proxied
/// setups) and as the origin of the subscription Location header.
pub(crate) fn request_origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{scheme}://{host}")
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_check))
        .merge(auth::routes())
        .merge(plans::routes())
        .merge(subscriptions::routes())
        .fallback(not_found);

    if state.config.cors_enabled {
        let allowed = state.config.cors_allowed_origins.clone();
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                move |origin: &axum::http::HeaderValue, _request_parts| {
                    origin
                        .to_str()
                        .map(|o| allowed.iter().any(|a| a == o))
                        .unwrap_or(false)
                },
            ))
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

        app = app.layer(cors);
    }

    app.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
    .with_state(state)
}
