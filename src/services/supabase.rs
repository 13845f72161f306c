// SPDX-License-Identifier: MIT

//! Supabase Auth (GoTrue) client.
//!
//! Handles:
//! - OAuth authorize redirect discovery (non-following GET)
//! - PKCE code exchange and refresh-token grants
//! - Logout and user-profile retrieval
//! - Translation of Supabase error bodies into the local taxonomy

use anyhow::anyhow;
use reqwest::header;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;

/// Supabase user record, as returned by `GET /auth/v1/user`.
///
/// Read-only and fetched per request; never persisted locally. Only the
/// fields the subscription flow needs are typed.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: Option<String>,
}

impl AuthenticatedUser {
    /// Display name used for the billing account.
    pub fn display_name(&self) -> String {
        self.email.clone().unwrap_or_else(|| self.id.clone())
    }
}

/// A downstream response forwarded verbatim to the client.
#[derive(Debug)]
pub struct Passthrough {
    pub status: u16,
    pub body: Value,
}

/// Supabase Auth API client.
///
/// Constructed per request because the base URL may fall back to the
/// incoming request's own origin when `SUPABASE_URL` is unset.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    /// `http` must be built with redirects disabled so the authorize call
    /// can observe the 302 instead of following it.
    pub fn new(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Discover the OAuth authorization redirect for the given PKCE challenge.
    ///
    /// Returns the `Location` the client should be redirected to.
    pub async fn authorize_location(
        &self,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, AppError> {
        let url = format!(
            "{}/auth/v1/authorize?provider=google&redirect_to={}&code_challenge={}&code_challenge_method=s256",
            self.base_url,
            urlencoding::encode(redirect_to),
            urlencoding::encode(code_challenge),
        );

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow!("Supabase authorize request failed: {e}")))?;

        if response.status().is_redirection() {
            return response
                .headers()
                .get(header::LOCATION)
                .and_then(|l| l.to_str().ok())
                .map(str::to_string)
                .ok_or(AppError::NoRedirectLocation);
        }

        let status = response.status().as_u16();
        tracing::warn!(status, "Unexpected status from Supabase authorize");
        Err(AppError::SupabaseOauth(status))
    }

    /// Exchange a PKCE authorization code for a token bundle.
    pub async fn exchange_token(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<Passthrough, AppError> {
        self.token_grant(
            "pkce",
            serde_json::json!({
                "auth_code": auth_code,
                "code_verifier": code_verifier,
            }),
        )
        .await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Passthrough, AppError> {
        self.token_grant(
            "refresh_token",
            serde_json::json!({ "refresh_token": refresh_token }),
        )
        .await
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<Passthrough, AppError> {
        let url = format!("{}/auth/v1/token?grant_type={grant_type}", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow!("Supabase token request failed: {e}")))?;

        self.passthrough(response).await
    }

    /// Invalidate the session behind the given Authorization header.
    pub async fn logout(&self, auth_header: &str) -> Result<(), AppError> {
        let url = format!("{}/auth/v1/logout", self.base_url);

        let response = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, auth_header)
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow!("Supabase logout request failed: {e}")))?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(translate_error(response).await)
    }

    /// Fetch the user record for `/auth/me`, forwarded verbatim.
    pub async fn user(&self, auth_header: &str) -> Result<Passthrough, AppError> {
        let response = self
            .user_response(auth_header)
            .await?;
        self.passthrough(response).await
    }

    /// Authenticate a request: resolve the Authorization header to a user.
    ///
    /// This is the explicit form of the usual "auth middleware stashes the
    /// user on the request" pattern; handlers that need a user call it and
    /// receive the value directly.
    pub async fn authenticated_user(
        &self,
        auth_header: &str,
    ) -> Result<AuthenticatedUser, AppError> {
        let response = self.user_response(auth_header).await?;

        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "Supabase rejected token");
            return Err(AppError::Unauthorized);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to parse Supabase user: {e}")))
    }

    async fn user_response(&self, auth_header: &str) -> Result<reqwest::Response, AppError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        self.http
            .get(&url)
            .header(header::AUTHORIZATION, auth_header)
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow!("Supabase user request failed: {e}")))
    }

    /// 2xx bodies pass through with their status; anything else is translated.
    async fn passthrough(&self, response: reqwest::Response) -> Result<Passthrough, AppError> {
        let status = response.status();
        if status.is_success() {
            let body = response
                .json()
                .await
                .map_err(|e| AppError::Internal(anyhow!("Failed to parse Supabase body: {e}")))?;
            return Ok(Passthrough {
                status: status.as_u16(),
                body,
            });
        }
        Err(translate_error(response).await)
    }
}

/// Map a Supabase error body onto the local taxonomy.
///
/// Field fallbacks are deliberate and multi-level: `error_code` else
/// `SUPABASE_ERROR`, and `error_description` else `msg` else a generic
/// message. GoTrue emits different shapes across endpoints.
async fn translate_error(response: reqwest::Response) -> AppError {
    let status = response.status().as_u16();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    let code = body
        .get("error_code")
        .and_then(Value::as_str)
        .map(str::to_string);
    let message = body
        .get("error_description")
        .and_then(Value::as_str)
        .or_else(|| body.get("msg").and_then(Value::as_str))
        .unwrap_or("Error from Supabase")
        .to_string();

    AppError::Supabase {
        status,
        code,
        message,
    }
}
