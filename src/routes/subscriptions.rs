// SPDX-License-Identifier: MIT

//! Subscription creation.
//!
//! A linear sequence of Kill Bill calls with per-step failure policy:
//! account lookup failures fall through to creation, account creation
//! failures are fatal, the existing-subscription scan is best-effort, and
//! subscription creation failures are fatal. The check-then-create pair is
//! not atomic; concurrent requests for one user can race past the scan.

use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::routes::auth::{authorization_header, supabase_client};
use crate::routes::request_origin;
use crate::services::killbill::BillingAccount;
use crate::services::supabase::AuthenticatedUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/subscriptions", post(create_subscription))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CreateSubscriptionBody {
    plan_id: Option<String>,
    // An `interval` field in the body is accepted but ignored: the billing
    // interval is already encoded in the plan id ("basic-monthly").
}

/// Create a subscription for the authenticated user.
async fn create_subscription(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    // Authentication is an explicit call, not middleware state.
    let auth = authorization_header(&headers)?;
    let supabase = supabase_client(&state, &headers)?;
    let user = supabase.authenticated_user(&auth).await?;

    let body: CreateSubscriptionBody = serde_json::from_slice(&body).unwrap_or_default();
    let plan_id = body.plan_id.ok_or(AppError::MissingField("PLAN_ID"))?;

    let account = get_or_create_account(&state, &user).await?;

    if has_active_subscription(&state, &account.account_id).await {
        return Err(AppError::AlreadySubscribed);
    }

    let external_key = format!(
        "sub-{}-{}",
        account.account_id,
        chrono::Utc::now().timestamp_millis()
    );

    let location = state
        .killbill
        .create_subscription(&account.account_id, &external_key, &plan_id)
        .await
        .map_err(|e| AppError::SubscriptionCreationFailed(e.to_string()))?;

    // The subscription id is the trailing path segment of the Location
    // header; its absence does not fail the request.
    let subscription_id = location
        .as_deref()
        .and_then(|l| l.trim_end_matches('/').rsplit('/').next())
        .unwrap_or("unknown")
        .to_string();

    tracing::info!(
        account_id = %account.account_id,
        plan = %plan_id,
        subscription_id = %subscription_id,
        "Subscription created"
    );

    let location = format!(
        "{}/subscriptions/{}",
        request_origin(&headers),
        subscription_id
    );

    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

/// Look up the billing account for the user, creating it on first use.
///
/// Lookup failures of any kind (not found, network) fall through to
/// creation; creation and re-fetch failures are fatal.
async fn get_or_create_account(
    state: &AppState,
    user: &AuthenticatedUser,
) -> Result<BillingAccount> {
    match state.killbill.account_by_external_key(&user.id).await {
        Ok(account) => Ok(account),
        Err(err) => {
            tracing::info!(
                user_id = %user.id,
                error = %err,
                "No billing account found, creating one"
            );

            let location = state
                .killbill
                .create_account(
                    &user.id,
                    &user.display_name(),
                    user.email.as_deref(),
                    &state.config.killbill_default_currency,
                )
                .await
                .map_err(|e| AppError::Internal(anyhow!("Account creation failed: {e}")))?;

            // Re-fetch from the Location URL for canonical field values.
            state
                .killbill
                .account_at(&location)
                .await
                .map_err(|e| AppError::Internal(anyhow!("Account re-fetch failed: {e}")))
        }
    }
}

/// Best-effort scan for an active, non-cancelled subscription.
///
/// Any failure is absorbed as "none found" so a flaky bundles endpoint
/// cannot block new subscriptions.
async fn has_active_subscription(state: &AppState, account_id: &str) -> bool {
    match state.killbill.bundles(account_id).await {
        Ok(bundles) => bundles
            .iter()
            .flat_map(|b| &b.subscriptions)
            .any(|s| s.is_active()),
        Err(err) => {
            tracing::warn!(
                account_id = %account_id,
                error = %err,
                "Bundle scan failed, treating as no existing subscription"
            );
            false
        }
    }
}
