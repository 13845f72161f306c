// SPDX-License-Identifier: MIT

//! Supabase OAuth authentication routes.
//!
//! Each handler is the same three-step pipeline: validate required inputs,
//! make exactly one Supabase call, translate the result. Validation is
//! fail-fast and happens before any downstream call.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::routes::request_origin;
use crate::services::supabase::Passthrough;
use crate::services::SupabaseClient;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/authorize", get(authorize))
        .route("/auth/exchange-token", post(exchange_token))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

/// Build the Supabase client for this request.
///
/// Base URL comes from configuration, falling back to the request's own
/// origin (locally proxied Supabase). A missing anon key is a configuration
/// error reported before any downstream call.
pub(crate) fn supabase_client(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SupabaseClient> {
    if state.config.supabase_anon_key.is_empty() {
        return Err(AppError::MissingApiKey);
    }

    let base_url = if state.config.supabase_url.is_empty() {
        request_origin(headers)
    } else {
        state.config.supabase_url.clone()
    };

    Ok(SupabaseClient::new(
        state.supabase_http.clone(),
        base_url,
        state.config.supabase_anon_key.clone(),
    ))
}

/// The Authorization header, required verbatim (forwarded downstream as-is).
pub(crate) fn authorization_header(headers: &HeaderMap) -> Result<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .ok_or(AppError::MissingAuthorization)
}

/// Forward a downstream response verbatim: its status, its JSON body.
fn forward(p: Passthrough) -> Response {
    let status = StatusCode::from_u16(p.status).unwrap_or(StatusCode::OK);
    (status, Json(p.body)).into_response()
}

#[derive(Deserialize)]
pub struct AuthorizeParams {
    redirect_to: Option<String>,
    code_challenge: Option<String>,
}

/// Start the OAuth flow: discover the provider redirect and pass it on.
async fn authorize(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthorizeParams>,
    headers: HeaderMap,
) -> Result<Response> {
    let redirect_to = params
        .redirect_to
        .ok_or(AppError::MissingField("REDIRECT_TO"))?;
    let code_challenge = params
        .code_challenge
        .ok_or(AppError::MissingField("CODE_CHALLENGE"))?;

    url::Url::parse(&redirect_to).map_err(|_| AppError::InvalidRedirectTo)?;

    let supabase = supabase_client(&state, &headers)?;
    let location = supabase
        .authorize_location(&redirect_to, &code_challenge)
        .await?;

    tracing::info!(redirect_to = %redirect_to, "Redirecting to Supabase OAuth");

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

#[derive(Deserialize, Default)]
struct ExchangeTokenBody {
    auth_code: Option<String>,
    code_verifier: Option<String>,
}

/// Exchange a PKCE authorization code for a token bundle.
async fn exchange_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let body: ExchangeTokenBody = serde_json::from_slice(&body).unwrap_or_default();
    let auth_code = body.auth_code.ok_or(AppError::MissingField("AUTH_CODE"))?;
    let code_verifier = body
        .code_verifier
        .ok_or(AppError::MissingField("CODE_VERIFIER"))?;

    let supabase = supabase_client(&state, &headers)?;
    let result = supabase.exchange_token(&auth_code, &code_verifier).await?;

    Ok(forward(result))
}

#[derive(Deserialize, Default)]
struct RefreshTokenBody {
    refresh_token: Option<String>,
}

/// Refresh an expired access token.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let body: RefreshTokenBody = serde_json::from_slice(&body).unwrap_or_default();
    let refresh_token = body
        .refresh_token
        .ok_or(AppError::MissingField("REFRESH_TOKEN"))?;

    let supabase = supabase_client(&state, &headers)?;
    let result = supabase.refresh_token(&refresh_token).await?;

    Ok(forward(result))
}

/// Invalidate the caller's session. Success is 204, no body.
async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<StatusCode> {
    let auth = authorization_header(&headers)?;

    let supabase = supabase_client(&state, &headers)?;
    supabase.logout(&auth).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch the caller's user record, forwarded verbatim.
async fn me(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    let auth = authorization_header(&headers)?;

    let supabase = supabase_client(&state, &headers)?;
    let result = supabase.user(&auth).await?;

    Ok(forward(result))
}
