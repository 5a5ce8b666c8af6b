//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API and webhook
//! verification behind the `PaymentStrategy` trait.

use crate::config::StripeConfig;
use crate::webhook::{parse_event, verify_signature};
use async_trait::async_trait;
use chrono::Utc;
use pay_core::{
    CheckoutRequest, CheckoutSession, CheckoutSettings, PaymentError, PaymentResult,
    PaymentStrategy, WebhookEvent, CHECKOUT_CURRENCY,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Every session is a one-time payment
const CHECKOUT_MODE: &str = "payment";

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page for secure payments.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Form parameters for a single-item checkout session
    fn build_form_params(
        request: &CheckoutRequest,
        settings: &CheckoutSettings,
    ) -> Vec<(String, String)> {
        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), CHECKOUT_MODE.to_string()),
            ("success_url".to_string(), settings.success_url.clone()),
            ("cancel_url".to_string(), settings.cancel_url.clone()),
            (
                "line_items[0][price_data][currency]".to_string(),
                CHECKOUT_CURRENCY.to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.value.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                settings.product_name.clone(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
        ];

        let mut metadata: Vec<_> = request.metadata().into_iter().collect();
        metadata.sort();
        for (key, value) in metadata {
            form_params.push((format!("metadata[{}]", key), value));
        }

        form_params
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, request, settings), fields(value = request.value))]
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
        settings: &CheckoutSettings,
    ) -> PaymentResult<CheckoutSession> {
        let form_params = Self::build_form_params(request, settings);

        debug!(
            "Creating Stripe checkout session: amount={}, currency={}",
            request.value, CHECKOUT_CURRENCY
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(PaymentError::ProviderError {
                    provider: "stripe".to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(PaymentError::ProviderError {
                provider: "stripe".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        info!(
            "Created Stripe checkout session: id={}, url={:?}",
            session_response.id, session_response.url
        );

        Ok(CheckoutSession {
            session_id: session_response.id,
            provider: "stripe".to_string(),
            checkout_url: session_response.url,
        })
    }

    #[instrument(skip(self, payload, signature), fields(bytes = payload.len()))]
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> PaymentResult<WebhookEvent> {
        verify_signature(
            payload,
            signature,
            &self.config.webhook_secret,
            self.config.webhook_tolerance_secs,
            Utc::now(),
        )?;

        parse_event(payload)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
