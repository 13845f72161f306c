// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Required secrets (the Supabase anon key) are deliberately *not* validated
//! at startup: their absence surfaces as a 500 `MISSING_API_KEY` on first
//! use, which keeps local runs of unrelated endpoints working.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supabase project base URL. Empty means "derive from the incoming
    /// request's own origin" (used when Supabase is proxied locally).
    pub supabase_url: String,
    /// Supabase anon (publishable) API key.
    pub supabase_anon_key: String,

    /// Kill Bill server base URL
    pub killbill_url: String,
    /// Kill Bill tenant API key/secret
    pub killbill_api_key: String,
    pub killbill_api_secret: String,
    /// Kill Bill basic-auth credentials
    pub killbill_username: String,
    pub killbill_password: String,
    /// Currency used when creating billing accounts
    pub killbill_default_currency: String,

    /// Contact details attached to enterprise-tier plans
    pub enterprise_contact_email: String,
    pub enterprise_contact_phone: Option<String>,
    pub enterprise_contact_body: String,

    /// CORS enable flag + allowed origins
    pub cors_enabled: bool,
    pub cors_allowed_origins: Vec<String>,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self {
            supabase_url: env::var("SUPABASE_URL").unwrap_or_default(),
            supabase_anon_key: env::var("SUPABASE_ANON_KEY").unwrap_or_default(),

            killbill_url: env::var("KILLBILL_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            killbill_api_key: env::var("KILLBILL_API_KEY").unwrap_or_default(),
            killbill_api_secret: env::var("KILLBILL_API_SECRET").unwrap_or_default(),
            killbill_username: env::var("KILLBILL_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            killbill_password: env::var("KILLBILL_PASSWORD")
                .unwrap_or_else(|_| "password".to_string()),
            killbill_default_currency: env::var("KILLBILL_DEFAULT_CURRENCY")
                .unwrap_or_else(|_| "USD".to_string()),

            enterprise_contact_email: env::var("ENTERPRISE_CONTACT_EMAIL").unwrap_or_default(),
            enterprise_contact_phone: env::var("ENTERPRISE_CONTACT_PHONE").ok(),
            enterprise_contact_body: env::var("ENTERPRISE_CONTACT_BODY")
                .unwrap_or_else(|_| "Contact us for enterprise pricing".to_string()),

            cors_enabled: env::var("CORS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        }
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            supabase_url: "http://supabase.test".to_string(),
            supabase_anon_key: "test_anon_key".to_string(),
            killbill_url: "http://killbill.test".to_string(),
            killbill_api_key: "bob".to_string(),
            killbill_api_secret: "lazar".to_string(),
            killbill_username: "admin".to_string(),
            killbill_password: "password".to_string(),
            killbill_default_currency: "USD".to_string(),
            enterprise_contact_email: "sales@example.com".to_string(),
            enterprise_contact_phone: Some("+1-555-0100".to_string()),
            enterprise_contact_body: "Contact us for enterprise pricing".to_string(),
            cors_enabled: false,
            cors_allowed_origins: vec![],
            port: 8080,
        }
    }
}
