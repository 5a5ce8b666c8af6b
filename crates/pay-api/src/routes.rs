//! # Routes
//!
//! Axum router configuration for the gateway.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router
///
/// Routes:
/// - POST /create-checkout-session/ - Create a hosted checkout session
///   (also served without the trailing slash)
/// - POST /webhook - Stripe webhook handler (raw body)
/// - GET  /health - Health check
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Checkout
        .route(
            "/create-checkout-session/",
            post(handlers::create_checkout_session),
        )
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        // Webhook
        .route("/webhook", post(handlers::stripe_webhook))
        // Middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        // State
        .with_state(state)
}
