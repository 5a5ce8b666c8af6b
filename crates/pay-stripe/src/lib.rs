//! # pay-stripe
//!
//! Stripe payment strategy for checkout-bridge.
//!
//! **StripeCheckoutStrategy** creates single-item Checkout Sessions and
//! verifies `Stripe-Signature` headers on incoming webhooks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_stripe::StripeCheckoutStrategy;
//! use pay_core::{CheckoutSettings, PaymentStrategy};
//!
//! // Create strategy from environment
//! let strategy = StripeCheckoutStrategy::from_env()?;
//!
//! // Create checkout session
//! let session = strategy
//!     .create_checkout(&request, &CheckoutSettings::for_frontend_url("https://shop.example.com"))
//!     .await?;
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use pay_stripe::{dispatch_webhook_event, OrderWebhookHandler};
//!
//! let handler = OrderWebhookHandler::new(store);
//!
//! // In your webhook endpoint:
//! let event = strategy.verify_webhook(payload, signature).await?;
//! let outcome = dispatch_webhook_event(&handler, event).await?;
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
pub use webhook::{
    dispatch_webhook_event, generate_signature_header, CheckoutCompletedData,
    OrderWebhookHandler, WebhookHandler, REQUIRED_WEBHOOK_EVENTS,
};
