//! # checkout-bridge
//!
//! Stripe checkout and webhook gateway that records completed orders in Supabase.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export SUPABASE_URL=https://<project>.supabase.co
//! export SUPABASE_KEY=...
//!
//! # Run the server
//! checkout-bridge
//! ```

use pay_api::{routes, AppConfig, AppState};
use pay_stripe::REQUIRED_WEBHOOK_EVENTS;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    init_logging(config.log_json);

    let addr = config.socket_addr()?;
    let is_prod = config.is_production();

    info!("Environment: {}", config.environment);
    info!("Persistence policy: {:?}", config.persistence_policy);

    // Initialize application state
    let state = AppState::from_config(config)?;

    info!("Payment provider: {}", state.strategy.provider_name());
    info!("Checkout product: {} (usd, one-time payment)", state.settings.product_name);
    info!("Checkout success URL: {}", state.settings.success_url);

    // Create router
    let app = routes::create_router(state);

    info!("checkout-bridge v{} listening on http://{}", env!("CARGO_PKG_VERSION"), addr);

    if !is_prod {
        info!("Checkout: POST http://{}/create-checkout-session/", addr);
        info!("Webhook: POST http://{}/webhook", addr);
        info!("Webhook events to enable: {:?}", REQUIRED_WEBHOOK_EVENTS);
        info!("Local testing: stripe listen --forward-to http://{}/webhook", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}
