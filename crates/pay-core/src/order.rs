//! # Order Types
//!
//! The persisted order record and the webhook event it is built from.

use crate::currency::minor_to_major;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A completed purchase, one row in the orders table.
///
/// Field names match the table's column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub full_name: String,
    pub full_address: String,
    pub phone: String,
    /// Total in major currency units (dollars)
    pub price: Decimal,
}

impl OrderRecord {
    /// Build a record from the provider's total in minor units
    pub fn from_minor_units(
        full_name: impl Into<String>,
        full_address: impl Into<String>,
        phone: impl Into<String>,
        amount_total: i64,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            full_address: full_address.into(),
            phone: phone.into(),
            price: minor_to_major(amount_total),
        }
    }
}

/// Webhook event types the gateway distinguishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// `checkout.session.completed`
    CheckoutCompleted,
    /// Anything else, kept verbatim for logging
    Unknown(String),
}

impl WebhookEventType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "checkout.session.completed" => WebhookEventType::CheckoutCompleted,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            WebhookEventType::CheckoutCompleted => "checkout.session.completed",
            WebhookEventType::Unknown(tag) => tag,
        }
    }
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider
    pub event_id: String,

    pub event_type: WebhookEventType,

    /// Provider name
    pub provider: String,

    /// The event's `data.object`
    pub data: serde_json::Map<String, serde_json::Value>,

    pub timestamp: DateTime<Utc>,
}

/// What the gateway did with a verified event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A completed checkout was written to the store
    Persisted(OrderRecord),
    /// Event type the gateway does not act on
    Ignored(String),
}
