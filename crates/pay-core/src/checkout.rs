//! # Checkout Types
//!
//! Request, settings and session types for hosted checkout creation.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Customer details captured before checkout.
///
/// Carried to the provider as session metadata and read back when the
/// session completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// Body of `POST /create-checkout-session/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Amount in minor currency units (cents)
    pub value: i64,
    pub details: CustomerDetails,
}

impl CheckoutRequest {
    pub fn new(value: i64, details: CustomerDetails) -> Self {
        Self { value, details }
    }

    /// Metadata attached to the session so the webhook can rebuild the order
    pub fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            ("price".to_string(), self.value.to_string()),
            ("name".to_string(), self.details.name.clone()),
            ("address".to_string(), self.details.address.clone()),
            ("phone".to_string(), self.details.phone.clone()),
        ])
    }
}

/// Fixed parts of every checkout session the gateway creates.
///
/// Currency and mode are not settable: every session is a one-time USD
/// payment. Unknown keys are rejected so a stray `currency` or `mode` in
/// the settings file fails at startup instead of being ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckoutSettings {
    /// Name shown on the single line item
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// Redirect after successful payment
    pub success_url: String,

    /// Redirect if the customer backs out
    pub cancel_url: String,
}

fn default_product_name() -> String {
    "Order".to_string()
}

impl CheckoutSettings {
    /// Redirect pages served by the storefront at `frontend_url`
    pub fn for_frontend_url(frontend_url: &str) -> Self {
        let frontend_url = frontend_url.trim_end_matches('/');
        Self {
            product_name: default_product_name(),
            success_url: format!(
                "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
                frontend_url
            ),
            cancel_url: format!("{}/checkout/cancel", frontend_url),
        }
    }

    /// Parse settings from a TOML document
    pub fn from_toml(content: &str) -> PaymentResult<Self> {
        toml::from_str(content)
            .map_err(|e| PaymentError::Configuration(format!("Invalid checkout settings: {}", e)))
    }
}

/// A checkout session created by a payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Provider name (e.g., "stripe")
    pub provider: String,

    /// Hosted page the customer is redirected to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
}

impl CheckoutSession {
    pub fn new(session_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            provider: provider.into(),
            checkout_url: None,
        }
    }
}
