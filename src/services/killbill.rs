// SPDX-License-Identifier: MIT

//! Kill Bill REST client.
//!
//! Every call carries the tenant headers (`X-Killbill-ApiKey`/`ApiSecret`)
//! and basic auth; mutations add `X-Killbill-CreatedBy`. Methods return
//! `anyhow::Result` because the fatal-vs-absorbed policy for a failure
//! belongs to the caller: a failed account lookup falls through to account
//! creation, while a failed creation aborts the request.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::services::catalog::CatalogVersion;

const CREATED_BY: &str = "subfront";

/// A Kill Bill account, keyed to the Supabase user via `external_key`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAccount {
    pub account_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub external_key: String,
    pub currency: Option<String>,
}

/// A bundle groups the subscriptions of one account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub cancelled_date: Option<String>,
}

impl Subscription {
    /// An active subscription that has not been cancelled blocks creation
    /// of a new one.
    pub fn is_active(&self) -> bool {
        self.state.as_deref() == Some("ACTIVE") && self.cancelled_date.is_none()
    }
}

/// Kill Bill API client.
#[derive(Clone)]
pub struct KillbillClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    username: String,
    password: String,
}

impl KillbillClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.killbill_url.trim_end_matches('/').to_string(),
            api_key: config.killbill_api_key.clone(),
            api_secret: config.killbill_api_secret.clone(),
            username: config.killbill_username.clone(),
            password: config.killbill_password.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header("X-Killbill-ApiKey", &self.api_key)
            .header("X-Killbill-ApiSecret", &self.api_secret)
    }

    /// Fetch all catalog versions for the tenant.
    pub async fn catalog(&self) -> Result<Vec<CatalogVersion>> {
        let url = format!("{}/1.0/kb/catalog", self.base_url);
        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .context("catalog request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("catalog fetch returned {}", response.status()));
        }
        response.json().await.context("invalid catalog response")
    }

    /// Look up an account by external key (the Supabase user id).
    pub async fn account_by_external_key(&self, external_key: &str) -> Result<BillingAccount> {
        let url = format!("{}/1.0/kb/accounts", self.base_url);
        let response = self
            .request(reqwest::Method::GET, &url)
            .query(&[("externalKey", external_key)])
            .send()
            .await
            .context("account lookup request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("account lookup returned {}", response.status()));
        }
        response.json().await.context("invalid account response")
    }

    /// Create an account; Kill Bill answers 201 with a `Location` header
    /// pointing at the new resource.
    pub async fn create_account(
        &self,
        external_key: &str,
        name: &str,
        email: Option<&str>,
        currency: &str,
    ) -> Result<String> {
        let url = format!("{}/1.0/kb/accounts", self.base_url);
        let body = json!({
            "externalKey": external_key,
            "name": name,
            "email": email,
            "currency": currency,
        });

        let response = self
            .request(reqwest::Method::POST, &url)
            .header("X-Killbill-CreatedBy", CREATED_BY)
            .json(&body)
            .send()
            .await
            .context("account creation request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("account creation returned {}", response.status()));
        }
        location_header(&response).ok_or_else(|| anyhow!("account creation returned no Location"))
    }

    /// Re-fetch an account from the `Location` returned by creation, to get
    /// the canonical field values.
    pub async fn account_at(&self, location: &str) -> Result<BillingAccount> {
        let response = self
            .request(reqwest::Method::GET, location)
            .send()
            .await
            .context("account re-fetch request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("account re-fetch returned {}", response.status()));
        }
        response.json().await.context("invalid account response")
    }

    /// Fetch all bundles (and therefore all subscriptions) of an account.
    pub async fn bundles(&self, account_id: &str) -> Result<Vec<Bundle>> {
        let url = format!("{}/1.0/kb/accounts/{account_id}/bundles", self.base_url);
        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .context("bundles request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("bundles fetch returned {}", response.status()));
        }
        response.json().await.context("invalid bundles response")
    }

    /// Create a subscription; returns the `Location` header when present.
    pub async fn create_subscription(
        &self,
        account_id: &str,
        external_key: &str,
        plan_name: &str,
    ) -> Result<Option<String>> {
        let url = format!("{}/1.0/kb/subscriptions", self.base_url);
        let body = json!({
            "accountId": account_id,
            "externalKey": external_key,
            "planName": plan_name,
        });

        let response = self
            .request(reqwest::Method::POST, &url)
            .header("X-Killbill-CreatedBy", CREATED_BY)
            .json(&body)
            .send()
            .await
            .context("subscription creation request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "subscription creation returned {}",
                response.status()
            ));
        }
        Ok(location_header(&response))
    }
}

fn location_header(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|l| l.to_str().ok())
        .map(str::to_string)
}
