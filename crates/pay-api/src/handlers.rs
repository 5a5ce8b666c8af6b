//! # Request Handlers
//!
//! Axum request handlers for session creation and the Stripe webhook.

use crate::state::{AppState, PersistencePolicy};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use pay_core::{CheckoutRequest, PaymentError, WebhookOutcome};
use pay_stripe::dispatch_webhook_event;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout session response.
///
/// Always sent with HTTP 200; failures travel in the `error` field.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CreateSessionResponse {
    Created {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Failed {
        error: String,
    },
}

/// Webhook acknowledgement
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl WebhookResponse {
    pub fn success() -> Self {
        Self {
            status: "success",
            message: Some("Order saved"),
        }
    }

    pub fn ignored() -> Self {
        Self {
            status: "ignored",
            message: None,
        }
    }
}

/// Error body for rejected webhook deliveries
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

type WebhookRejection = (StatusCode, Json<ErrorDetail>);

fn reject(status: StatusCode, detail: impl Into<String>) -> WebhookRejection {
    (
        status,
        Json(ErrorDetail {
            detail: detail.into(),
        }),
    )
}

fn verification_rejection(err: &PaymentError) -> WebhookRejection {
    match err.webhook_detail() {
        Some(detail) => reject(StatusCode::BAD_REQUEST, detail),
        None => reject(
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "Webhook processing failed",
        ),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "checkout-bridge",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a hosted checkout session
#[instrument(skip(state, request), fields(value = request.value))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Json<CreateSessionResponse> {
    match state.strategy.create_checkout(&request, &state.settings).await {
        Ok(session) => {
            info!(
                provider = %session.provider,
                checkout_url = ?session.checkout_url,
                "Created checkout session: {}",
                session.session_id
            );
            Json(CreateSessionResponse::Created {
                session_id: session.session_id,
            })
        }
        Err(e) => {
            error!("Failed to create checkout: {}", e);
            Json(CreateSessionResponse::Failed {
                error: e.to_string(),
            })
        }
    }
}

/// Handle Stripe webhook
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookRejection> {
    info!("Webhook received");

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Webhook rejected: missing Stripe-Signature header");
            reject(StatusCode::BAD_REQUEST, "Invalid signature")
        })?;

    let event = state
        .strategy
        .verify_webhook(&body, signature)
        .await
        .map_err(|e| {
            warn!("Webhook verification failed: {}", e);
            verification_rejection(&e)
        })?;

    info!(
        "Verified webhook: type={}, id={}, created={}",
        event.event_type.as_tag(),
        event.event_id,
        event.timestamp
    );

    match dispatch_webhook_event(state.webhook_handler.as_ref(), event).await {
        Ok(WebhookOutcome::Persisted(_)) => Ok(Json(WebhookResponse::success())),
        Ok(WebhookOutcome::Ignored(event_type)) => {
            info!("Ignoring webhook event: {}", event_type);
            Ok(Json(WebhookResponse::ignored()))
        }
        Err(e @ PaymentError::Persistence { .. }) => {
            error!("Order was not saved: {}", e);
            match state.config.persistence_policy {
                PersistencePolicy::Acknowledge => Ok(Json(WebhookResponse::success())),
                PersistencePolicy::Reject => Err(reject(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Order not saved",
                )),
            }
        }
        Err(e) => {
            warn!("Webhook event rejected: {}", e);
            Err(verification_rejection(&e))
        }
    }
}
