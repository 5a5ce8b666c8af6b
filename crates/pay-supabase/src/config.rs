//! # Supabase Configuration
//!
//! Project URL, API key and target table, loaded from the environment.

use pay_core::PaymentError;
use std::env;

const DEFAULT_ORDERS_TABLE: &str = "Orders";

/// Supabase project configuration
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (https://<ref>.supabase.co)
    pub url: String,

    /// Service role or anon key
    pub api_key: String,

    /// Table completed orders are inserted into
    pub orders_table: String,
}

impl SupabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SUPABASE_URL` (or legacy `supabase_url`)
    /// - `SUPABASE_KEY` (or legacy `supabase_key`)
    ///
    /// Optional:
    /// - `SUPABASE_ORDERS_TABLE` (default `Orders`)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("SUPABASE_URL")
            .or_else(|| lookup("supabase_url"))
            .ok_or_else(|| PaymentError::Configuration("SUPABASE_URL not set".to_string()))?;

        let api_key = lookup("SUPABASE_KEY")
            .or_else(|| lookup("supabase_key"))
            .ok_or_else(|| PaymentError::Configuration("SUPABASE_KEY not set".to_string()))?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PaymentError::Configuration(
                "SUPABASE_URL must be an http(s) URL".to_string(),
            ));
        }

        let mut config = Self::new(url, api_key);
        if let Some(table) = lookup("SUPABASE_ORDERS_TABLE") {
            config.orders_table = table;
        }
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            orders_table: DEFAULT_ORDERS_TABLE.to_string(),
        }
    }

    /// PostgREST endpoint for a table
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}
