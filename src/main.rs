// SPDX-License-Identifier: MIT

//! Subfront API server
//!
//! Backend-for-frontend exposing OAuth authentication (via Supabase),
//! plan listing and subscription creation (via Kill Bill).

use std::sync::Arc;

use subfront::{config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env();
    tracing::info!(port = config.port, "Starting Subfront API");

    if config.supabase_url.is_empty() {
        tracing::warn!("SUPABASE_URL not set; falling back to request origin per call");
    }

    let state = Arc::new(AppState::new(config.clone()).expect("Failed to build HTTP clients"));

    let app = subfront::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("subfront=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
