//! # Collaborator Traits
//!
//! The two seams the gateway talks through: a payment provider that
//! creates sessions and verifies webhooks, and a store that keeps orders.
//!
//! ```text
//!   client ──► PaymentStrategy::create_checkout ──► provider
//!   provider ──► PaymentStrategy::verify_webhook ──► OrderStore::insert_order
//! ```

use crate::checkout::{CheckoutRequest, CheckoutSession, CheckoutSettings};
use crate::error::PaymentResult;
use crate::order::{OrderRecord, WebhookEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Payment provider used for hosted checkout and webhook verification.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a hosted checkout session for a single-item purchase.
    ///
    /// # Arguments
    /// * `request` - Amount and customer details
    /// * `settings` - Product name and redirect URLs
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
        settings: &CheckoutSettings,
    ) -> PaymentResult<CheckoutSession>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes
    /// * `signature` - Signature header from the request
    ///
    /// # Returns
    /// A parsed `WebhookEvent` if signature is valid.
    async fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> PaymentResult<WebhookEvent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Data store the completed orders are written to.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert one order row. No deduplication is performed.
    async fn insert_order(&self, order: &OrderRecord) -> PaymentResult<()>;

    /// Get the store name (for logging).
    fn store_name(&self) -> &'static str;
}

/// Type alias for a shared payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Type alias for a shared order store (dynamic dispatch)
pub type BoxedOrderStore = Arc<dyn OrderStore>;
