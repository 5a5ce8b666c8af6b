//! # Stripe Webhook Handling
//!
//! Signature verification, event parsing and dispatch for Stripe webhooks.
//!
//! Stripe signs each delivery with a `Stripe-Signature` header of the form
//! `t=<unix timestamp>,v1=<hex hmac>[,v1=...]`, where the HMAC-SHA256 is
//! computed over `"{t}.{raw body}"` with the endpoint's signing secret.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use pay_core::{
    BoxedOrderStore, OrderRecord, PaymentError, PaymentResult, WebhookEvent,
    WebhookEventType, WebhookOutcome,
};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Signature Verification
// =============================================================================

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> PaymentResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        PaymentError::SignatureInvalid("Missing timestamp in signature header".to_string())
    })?;

    if signatures.is_empty() {
        return Err(PaymentError::SignatureInvalid(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> PaymentResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Configuration(format!("Invalid webhook secret: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check a `Stripe-Signature` header against the raw body.
///
/// The body must be UTF-8; anything else is a malformed payload rather
/// than a bad signature. Timestamps older than `tolerance_secs` are
/// rejected; timestamps from the future are accepted.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: DateTime<Utc>,
) -> PaymentResult<()> {
    std::str::from_utf8(payload)
        .map_err(|e| PaymentError::MalformedPayload(format!("Body is not UTF-8: {}", e)))?;

    let parsed = parse_signature_header(header)?;

    if parsed.timestamp < now.timestamp() - tolerance_secs {
        return Err(PaymentError::SignatureInvalid(
            "Timestamp outside the tolerance zone".to_string(),
        ));
    }

    let expected = compute_signature(secret, parsed.timestamp, payload)?;

    let valid = parsed
        .signatures
        .iter()
        .any(|sig| constant_time_compare(sig, &expected));

    if !valid {
        return Err(PaymentError::SignatureInvalid(
            "No signatures found matching the expected signature for payload".to_string(),
        ));
    }

    Ok(())
}

/// Build a valid `Stripe-Signature` header for a payload.
///
/// Useful for local testing without the Stripe CLI.
pub fn generate_signature_header(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> PaymentResult<String> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, signature))
}

// =============================================================================
// Event Parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

/// Parse a (verified) Stripe event envelope
pub fn parse_event(payload: &[u8]) -> PaymentResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
        PaymentError::MalformedPayload(format!("Failed to parse webhook: {}", e))
    })?;

    debug!("Parsed Stripe webhook: type={}", event.event_type);

    Ok(WebhookEvent {
        event_id: event.id,
        event_type: WebhookEventType::from_tag(&event.event_type),
        provider: "stripe".to_string(),
        data: event.data.object,
        timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
    })
}

/// Parsed checkout.session.completed event data
#[derive(Debug, Clone)]
pub struct CheckoutCompletedData {
    pub session_id: String,
    pub customer_email: Option<String>,
    /// Total in minor units
    pub amount_total: i64,
    pub payment_status: String,
    pub metadata: HashMap<String, String>,
}

impl CheckoutCompletedData {
    /// Parse from a webhook event
    pub fn from_event(event: &WebhookEvent) -> PaymentResult<Self> {
        let obj = &event.data;

        let session_id = obj
            .get("id")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| PaymentError::MalformedPayload("Missing session id".to_string()))?;

        let customer_email = obj
            .get("customer_email")
            .and_then(|v| v.as_str())
            .or_else(|| {
                obj.get("customer_details")
                    .and_then(|cd| cd.get("email"))
                    .and_then(|v| v.as_str())
            })
            .map(String::from);

        let amount_total = obj
            .get("amount_total")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| PaymentError::MalformedPayload("Missing amount_total".to_string()))?;

        let payment_status = obj
            .get("payment_status")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let metadata = obj
            .get("metadata")
            .and_then(|m| m.as_object())
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            session_id,
            customer_email,
            amount_total,
            payment_status,
            metadata,
        })
    }

    /// Check if payment was successful
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    fn metadata_field(&self, key: &str) -> String {
        match self.metadata.get(key) {
            Some(value) => value.clone(),
            None => {
                warn!(session_id = %self.session_id, key, "Session metadata missing field");
                String::new()
            }
        }
    }

    /// Build the order row from the session's metadata and total
    pub fn order_record(&self) -> OrderRecord {
        OrderRecord::from_minor_units(
            self.metadata_field("name"),
            self.metadata_field("address"),
            self.metadata_field("phone"),
            self.amount_total,
        )
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Webhook event handler trait
///
/// Implement this trait to act on verified events.
#[async_trait::async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Called when a checkout session is completed
    async fn on_checkout_completed(
        &self,
        data: CheckoutCompletedData,
    ) -> PaymentResult<WebhookOutcome>;

    /// Called for every other event type
    async fn on_unknown_event(&self, event: &WebhookEvent) -> PaymentResult<WebhookOutcome> {
        debug!("Unhandled webhook event: {}", event.event_type.as_tag());
        Ok(WebhookOutcome::Ignored(event.event_type.as_tag().to_string()))
    }
}

/// Dispatch a webhook event to the appropriate handler method
pub async fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: WebhookEvent,
) -> PaymentResult<WebhookOutcome> {
    match &event.event_type {
        WebhookEventType::CheckoutCompleted => {
            let data = CheckoutCompletedData::from_event(&event)?;
            handler.on_checkout_completed(data).await
        }
        WebhookEventType::Unknown(_) => handler.on_unknown_event(&event).await,
    }
}

/// Handler that writes every completed checkout to an order store
#[derive(Clone)]
pub struct OrderWebhookHandler {
    store: BoxedOrderStore,
}

impl OrderWebhookHandler {
    pub fn new(store: BoxedOrderStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl WebhookHandler for OrderWebhookHandler {
    async fn on_checkout_completed(
        &self,
        data: CheckoutCompletedData,
    ) -> PaymentResult<WebhookOutcome> {
        info!(
            session_id = %data.session_id,
            customer_email = ?data.customer_email,
            amount_total = data.amount_total,
            paid = data.is_paid(),
            "Checkout completed"
        );

        let order = data.order_record();
        self.store.insert_order(&order).await?;

        info!(
            session_id = %data.session_id,
            store = self.store.store_name(),
            price = %order.price,
            "Order saved"
        );
        Ok(WebhookOutcome::Persisted(order))
    }
}

/// Events that should be enabled in the Stripe Dashboard
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &["checkout.session.completed"];
