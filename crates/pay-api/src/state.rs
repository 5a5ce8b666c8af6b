//! # Application State
//!
//! Shared state for the Axum application.
//! Built once at startup and handed to every handler; nothing in it is
//! mutated after that.

use pay_core::{BoxedOrderStore, BoxedPaymentStrategy, CheckoutSettings, PaymentError};
use pay_stripe::{OrderWebhookHandler, StripeCheckoutStrategy, WebhookHandler};
use pay_supabase::SupabaseOrderStore;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

/// What the webhook answers when a completed order could not be saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistencePolicy {
    /// Report success anyway; the provider will not redeliver
    #[default]
    Acknowledge,
    /// Fail the delivery with HTTP 500 so the provider redelivers
    Reject,
}

impl FromStr for PersistencePolicy {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "acknowledge" | "ack" => Ok(PersistencePolicy::Acknowledge),
            "reject" => Ok(PersistencePolicy::Reject),
            other => Err(PaymentError::Configuration(format!(
                "WEBHOOK_PERSISTENCE_POLICY must be 'acknowledge' or 'reject', got '{}'",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Storefront serving the checkout success and cancel pages
    pub frontend_url: Option<String>,
    /// Environment (development, staging, production)
    pub environment: String,
    pub persistence_policy: PersistencePolicy,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| PaymentError::Configuration(format!("Invalid PORT: {}", p)))?,
            None => 8080,
        };

        let persistence_policy = match lookup("WEBHOOK_PERSISTENCE_POLICY") {
            Some(policy) => policy.parse()?,
            None => PersistencePolicy::default(),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            frontend_url: lookup("FRONTEND_URL").filter(|url| !url.trim().is_empty()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            persistence_policy,
            log_json: lookup("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, PaymentError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| PaymentError::Configuration(format!("Invalid socket address: {}", e)))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            frontend_url: None,
            environment: "development".to_string(),
            persistence_policy: PersistencePolicy::default(),
            log_json: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment provider
    pub strategy: BoxedPaymentStrategy,
    /// Acts on verified webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Fixed parts of every checkout session
    pub settings: Arc<CheckoutSettings>,
    /// Application config
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire explicit collaborators together
    pub fn new(
        config: AppConfig,
        settings: CheckoutSettings,
        strategy: BoxedPaymentStrategy,
        store: BoxedOrderStore,
    ) -> Self {
        Self {
            strategy,
            webhook_handler: Arc::new(OrderWebhookHandler::new(store)),
            settings: Arc::new(settings),
            config: Arc::new(config),
        }
    }

    /// Create a new AppState with Stripe and Supabase configured from the environment
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let settings = checkout_settings(read_settings_file(), config.frontend_url.as_deref())?;

        let strategy = StripeCheckoutStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        if strategy.config().is_test_mode() {
            tracing::info!("Stripe mode: test");
        } else {
            tracing::warn!("Stripe mode: live, real cards will be charged");
        }

        let store = SupabaseOrderStore::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Supabase: {}", e))?;

        Ok(Self::new(
            config,
            settings,
            Arc::new(strategy),
            Arc::new(store),
        ))
    }
}

const SETTINGS_PATHS: [&str; 3] = [
    "config/checkout.toml",
    "../config/checkout.toml",
    "../../config/checkout.toml",
];

/// First checkout settings file found on the search path, with its contents
fn read_settings_file() -> Option<(&'static str, String)> {
    SETTINGS_PATHS
        .into_iter()
        .find_map(|path| std::fs::read_to_string(path).ok().map(|content| (path, content)))
}

/// Resolve checkout settings.
///
/// A settings file wins. Without one the redirect pages are built from
/// `FRONTEND_URL`; with neither there is nowhere to send the customer and
/// startup fails.
fn checkout_settings(
    file: Option<(&str, String)>,
    frontend_url: Option<&str>,
) -> anyhow::Result<CheckoutSettings> {
    if let Some((path, content)) = file {
        let settings = CheckoutSettings::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
        tracing::info!("Loaded checkout settings from {}", path);
        return Ok(settings);
    }

    match frontend_url {
        Some(url) => {
            tracing::info!("No checkout settings file found, redirecting to {}", url);
            Ok(CheckoutSettings::for_frontend_url(url))
        }
        None => anyhow::bail!(
            "No checkout redirect pages configured: set FRONTEND_URL or provide config/checkout.toml"
        ),
    }
}
