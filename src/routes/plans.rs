// SPDX-License-Identifier: MIT

//! Plan listing from the Kill Bill catalog.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::services::catalog::{plans_from_catalog, ContactUs, Interval, Plan};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/plans", get(list_plans))
}

#[derive(Deserialize)]
struct PlansQuery {
    interval: Option<String>,
}

/// List customer-selectable plans, optionally filtered by billing interval.
async fn list_plans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlansQuery>,
) -> Result<Json<Vec<Plan>>> {
    // Interval validation happens before the catalog fetch.
    let interval = match query.interval.as_deref() {
        None => None,
        Some("month") => Some(Interval::Month),
        Some("year") => Some(Interval::Year),
        Some(other) => {
            tracing::debug!(interval = other, "Rejecting unknown interval");
            return Err(AppError::InvalidInterval);
        }
    };

    // Any fetch failure (network, non-2xx, malformed body) is reported
    // uniformly; the distinction is not exposed to the client.
    let versions = state
        .killbill
        .catalog()
        .await
        .map_err(|e| AppError::KillbillUnavailable(e.to_string()))?;

    let contact = ContactUs {
        email: state.config.enterprise_contact_email.clone(),
        phone: state.config.enterprise_contact_phone.clone(),
        body: state.config.enterprise_contact_body.clone(),
    };

    let plans = plans_from_catalog(&versions, interval, &contact);
    if plans.is_empty() {
        return Err(AppError::NoPlansAvailable);
    }

    Ok(Json(plans))
}
