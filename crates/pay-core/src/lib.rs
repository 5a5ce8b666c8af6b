//! # pay-core
//!
//! Core types and traits for the checkout-bridge gateway.
//!
//! This crate provides:
//! - `PaymentStrategy` trait for the payment provider (sessions + webhooks)
//! - `OrderStore` trait for the data store completed orders land in
//! - `CheckoutRequest`, `CheckoutSettings` and `CheckoutSession` for checkout
//! - `OrderRecord`, `WebhookEvent` and `WebhookOutcome` for webhook handling
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{CheckoutRequest, CheckoutSettings, CustomerDetails, PaymentStrategy};
//!
//! let request = CheckoutRequest::new(1500, CustomerDetails {
//!     name: "Ada".into(),
//!     address: "1 Loop Rd".into(),
//!     phone: "555-0100".into(),
//! });
//!
//! let session = strategy
//!     .create_checkout(&request, &CheckoutSettings::for_frontend_url("https://shop.example.com"))
//!     .await?;
//!
//! // Hand session.session_id to the browser for the redirect
//! ```

pub mod checkout;
pub mod currency;
pub mod error;
pub mod order;
pub mod strategy;

// Re-exports for convenience
pub use checkout::{CheckoutRequest, CheckoutSession, CheckoutSettings, CustomerDetails};
pub use currency::{minor_to_major, CHECKOUT_CURRENCY};
pub use error::{PaymentError, PaymentResult};
pub use order::{OrderRecord, WebhookEvent, WebhookEventType, WebhookOutcome};
pub use strategy::{BoxedOrderStore, BoxedPaymentStrategy, OrderStore, PaymentStrategy};
