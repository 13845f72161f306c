// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.
//!
//! Every failure path in the service renders as `{code, message, details?}`
//! JSON. Handlers return `Result<_, AppError>`, so a structured body is
//! guaranteed for every non-2xx response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required query parameter or body field is absent. The field name is
    /// carried in `SCREAMING_SNAKE` form and becomes the `MISSING_<FIELD>` code.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("redirect_to must be a valid absolute URL")]
    InvalidRedirectTo,

    #[error("interval must be 'month' or 'year'")]
    InvalidInterval,

    #[error("Authorization header is required")]
    MissingAuthorization,

    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("Supabase API key is not configured")]
    MissingApiKey,

    #[error("Supabase returned a redirect without a Location header")]
    NoRedirectLocation,

    /// OAuth authorize call failed; the downstream status is forwarded.
    #[error("OAuth error from Supabase (status {0})")]
    SupabaseOauth(u16),

    /// Translated Supabase API error. `code` and `message` already carry the
    /// downstream fallback chain (`error_code`, `error_description`/`msg`).
    #[error("{message}")]
    Supabase {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Billing engine unavailable")]
    KillbillUnavailable(String),

    #[error("No plans available")]
    NoPlansAvailable,

    #[error("An active subscription already exists for this account")]
    AlreadySubscribed,

    #[error("Subscription creation failed")]
    SubscriptionCreationFailed(String),

    #[error("Not Found")]
    NotFound,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Forward a downstream status when it is a meaningful error status,
/// otherwise fall back to 500.
fn passthrough_status(status: u16) -> StatusCode {
    match StatusCode::from_u16(status) {
        Ok(s) if s.is_client_error() || s.is_server_error() => s,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    /// The stable machine-readable code for this error.
    pub fn code(&self) -> String {
        match self {
            AppError::MissingField(field) => format!("MISSING_{field}"),
            AppError::InvalidRedirectTo => "INVALID_REDIRECT_TO".to_string(),
            AppError::InvalidInterval => "INVALID_INTERVAL".to_string(),
            AppError::MissingAuthorization => "MISSING_AUTHORIZATION".to_string(),
            AppError::Unauthorized => "UNAUTHORIZED".to_string(),
            AppError::MissingApiKey => "MISSING_API_KEY".to_string(),
            AppError::NoRedirectLocation => "NO_REDIRECT_LOCATION".to_string(),
            AppError::SupabaseOauth(_) => "SUPABASE_OAUTH_ERROR".to_string(),
            AppError::Supabase { code, .. } => code
                .clone()
                .unwrap_or_else(|| "SUPABASE_ERROR".to_string()),
            AppError::KillbillUnavailable(_) => "KILLBILL_UNAVAILABLE".to_string(),
            AppError::NoPlansAvailable => "NO_PLANS_AVAILABLE".to_string(),
            AppError::AlreadySubscribed => "ALREADY_SUBSCRIBED".to_string(),
            AppError::SubscriptionCreationFailed(_) => "SUBSCRIPTION_CREATION_FAILED".to_string(),
            AppError::NotFound => "NOT_FOUND".to_string(),
            AppError::Internal(_) => "INTERNAL_ERROR".to_string(),
        }
    }

    /// The HTTP status this error renders with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingField(_)
            | AppError::InvalidRedirectTo
            | AppError::InvalidInterval => StatusCode::BAD_REQUEST,
            AppError::MissingAuthorization | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::MissingApiKey
            | AppError::NoRedirectLocation
            | AppError::SubscriptionCreationFailed(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SupabaseOauth(status) | AppError::Supabase { status, .. } => {
                passthrough_status(*status)
            }
            AppError::KillbillUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NoPlansAvailable | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AlreadySubscribed => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = match &self {
            AppError::KillbillUnavailable(detail)
            | AppError::SubscriptionCreationFailed(detail) => {
                tracing::error!(error = %detail, "Billing engine error");
                Some(detail.clone())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                None
            }
            _ => None,
        };

        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
            details,
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
