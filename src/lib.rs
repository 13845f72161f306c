// SPDX-License-Identifier: MIT

//! Subfront: backend-for-frontend for OAuth sign-in and subscriptions.
//!
//! Delegates authentication to Supabase Auth and subscription management
//! to Kill Bill; every endpoint validates input, forwards one or a few
//! downstream HTTP calls, and translates the result into a uniform
//! `{code, message, details?}` error shape.

pub mod config;
pub mod error;
pub mod routes;
pub mod services;

use config::Config;
use services::KillbillClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// HTTP client with redirects disabled, so the Supabase authorize call
    /// can observe the 302 instead of following it.
    pub supabase_http: reqwest::Client,
    pub killbill: KillbillClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let supabase_http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        let killbill = KillbillClient::new(&config);

        Ok(Self {
            config,
            supabase_http,
            killbill,
        })
    }
}
