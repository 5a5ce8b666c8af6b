use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::Utc;
use pay_api::{create_router, AppConfig, AppState, PersistencePolicy};
use pay_core::{
    CheckoutRequest, CheckoutSession, CheckoutSettings, OrderRecord, OrderStore, PaymentError,
    PaymentResult, PaymentStrategy, WebhookEvent,
};
use pay_stripe::webhook::{parse_event, verify_signature};
use pay_stripe::{generate_signature_header, StripeCheckoutStrategy, StripeConfig};
use pay_supabase::InMemoryOrderStore;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Provider stand-in: canned session creation, real signature checks
#[derive(Default)]
struct StubStrategy {
    requests: Mutex<Vec<CheckoutRequest>>,
    fail_with: Option<String>,
}

#[async_trait]
impl PaymentStrategy for StubStrategy {
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
        _settings: &CheckoutSettings,
    ) -> PaymentResult<CheckoutSession> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.fail_with {
            Some(message) => Err(PaymentError::ProviderError {
                provider: "stub".into(),
                message: message.clone(),
            }),
            None => Ok(CheckoutSession::new("cs_test_stub", "stub")),
        }
    }

    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> PaymentResult<WebhookEvent> {
        verify_signature(payload, signature, WEBHOOK_SECRET, 300, Utc::now())?;
        parse_event(payload)
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

struct FailingStore;

#[async_trait]
impl OrderStore for FailingStore {
    async fn insert_order(&self, _order: &OrderRecord) -> PaymentResult<()> {
        Err(PaymentError::Persistence {
            store: "failing".into(),
            message: "connection reset".into(),
        })
    }

    fn store_name(&self) -> &'static str {
        "failing"
    }
}

fn server_with(
    strategy: Arc<dyn PaymentStrategy>,
    store: Arc<dyn OrderStore>,
    policy: PersistencePolicy,
) -> TestServer {
    let config = AppConfig {
        persistence_policy: policy,
        ..AppConfig::default()
    };
    let state = AppState::new(
        config,
        CheckoutSettings::for_frontend_url("http://localhost:3000"),
        strategy,
        store,
    );
    TestServer::new(create_router(state)).unwrap()
}

fn completed_event(amount_total: i64, metadata: Value) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "id": "evt_test",
        "type": "checkout.session.completed",
        "created": Utc::now().timestamp(),
        "data": {
            "object": {
                "id": "cs_test_stub",
                "customer_email": "ada@example.com",
                "amount_total": amount_total,
                "currency": "usd",
                "payment_status": "paid",
                "metadata": metadata
            }
        }
    }))
    .unwrap()
}

fn signature_for(payload: &[u8]) -> HeaderValue {
    let header = generate_signature_header(WEBHOOK_SECRET, Utc::now().timestamp(), payload).unwrap();
    HeaderValue::from_str(&header).unwrap()
}

fn stripe_signature() -> HeaderName {
    HeaderName::from_static("stripe-signature")
}

fn checkout_body() -> Value {
    json!({"value": 1500, "details": {"name": "A", "address": "B", "phone": "C"}})
}

#[tokio::test]
async fn health_reports_service() {
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(InMemoryOrderStore::new()),
        PersistencePolicy::Acknowledge,
    );

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["service"], "checkout-bridge");
}

#[tokio::test]
async fn create_session_returns_session_id() {
    let strategy = Arc::new(StubStrategy::default());
    let server = server_with(
        strategy.clone(),
        Arc::new(InMemoryOrderStore::new()),
        PersistencePolicy::Acknowledge,
    );

    let response = server
        .post("/create-checkout-session/")
        .json(&checkout_body())
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"sessionId": "cs_test_stub"}));

    let requests = strategy.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].value, 1500);
    assert_eq!(requests[0].details.name, "A");
}

#[tokio::test]
async fn create_session_without_trailing_slash() {
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(InMemoryOrderStore::new()),
        PersistencePolicy::Acknowledge,
    );

    let response = server
        .post("/create-checkout-session")
        .json(&checkout_body())
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["sessionId"], "cs_test_stub");
}

#[tokio::test]
async fn create_session_failure_is_reported_in_body() {
    let strategy = Arc::new(StubStrategy {
        fail_with: Some("Invalid API Key provided".into()),
        ..Default::default()
    });
    let server = server_with(
        strategy,
        Arc::new(InMemoryOrderStore::new()),
        PersistencePolicy::Acknowledge,
    );

    let response = server
        .post("/create-checkout-session/")
        .json(&checkout_body())
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert!(body.get("sessionId").is_none());
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Invalid API Key provided"));
}

#[tokio::test]
async fn create_session_rejects_missing_details() {
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(InMemoryOrderStore::new()),
        PersistencePolicy::Acknowledge,
    );

    let response = server
        .post("/create-checkout-session/")
        .json(&json!({"value": 1500}))
        .expect_failure()
        .await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn webhook_saves_completed_checkout() {
    let store = InMemoryOrderStore::new();
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(store.clone()),
        PersistencePolicy::Acknowledge,
    );

    let payload = completed_event(1050, json!({"name": "A", "address": "B", "phone": "C"}));
    let response = server
        .post("/webhook")
        .add_header(stripe_signature(), signature_for(&payload))
        .bytes(payload.into())
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"status": "success", "message": "Order saved"})
    );

    let orders = store.orders().await;
    assert_eq!(orders, vec![OrderRecord::from_minor_units("A", "B", "C", 1050)]);
    assert_eq!(orders[0].price.to_string(), "10.50");
}

#[tokio::test]
async fn webhook_price_uses_exact_division() {
    let store = InMemoryOrderStore::new();
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(store.clone()),
        PersistencePolicy::Acknowledge,
    );

    for amount in [999, 1000] {
        let payload = completed_event(amount, json!({"name": "A", "address": "B", "phone": "C"}));
        server
            .post("/webhook")
            .add_header(stripe_signature(), signature_for(&payload))
            .bytes(payload.into())
            .await
            .assert_status_ok();
    }

    let prices: Vec<String> = store
        .orders()
        .await
        .iter()
        .map(|o| o.price.to_string())
        .collect();
    assert_eq!(prices, vec!["9.99", "10.00"]);
}

#[tokio::test]
async fn webhook_rejects_bad_signature() {
    let store = InMemoryOrderStore::new();
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(store.clone()),
        PersistencePolicy::Acknowledge,
    );

    let payload = completed_event(1500, json!({}));
    let forged = generate_signature_header("whsec_wrong", Utc::now().timestamp(), &payload).unwrap();

    let response = server
        .post("/webhook")
        .add_header(stripe_signature(), HeaderValue::from_str(&forged).unwrap())
        .bytes(payload.into())
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({"detail": "Invalid signature"}));
    assert!(store.orders().await.is_empty());
}

#[tokio::test]
async fn webhook_rejects_missing_signature() {
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(InMemoryOrderStore::new()),
        PersistencePolicy::Acknowledge,
    );

    let response = server
        .post("/webhook")
        .bytes(completed_event(1500, json!({})).into())
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({"detail": "Invalid signature"}));
}

#[tokio::test]
async fn webhook_rejects_malformed_payload() {
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(InMemoryOrderStore::new()),
        PersistencePolicy::Acknowledge,
    );

    let payload = b"{\"type\": \"checkout.session.completed\", ".to_vec();
    let response = server
        .post("/webhook")
        .add_header(stripe_signature(), signature_for(&payload))
        .bytes(payload.into())
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({"detail": "Invalid payload"}));
}

#[tokio::test]
async fn webhook_rejects_completed_event_without_amount() {
    let store = InMemoryOrderStore::new();
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(store.clone()),
        PersistencePolicy::Acknowledge,
    );

    let payload = serde_json::to_vec(&json!({
        "id": "evt_test",
        "type": "checkout.session.completed",
        "created": Utc::now().timestamp(),
        "data": { "object": { "id": "cs_test_stub", "metadata": {} } }
    }))
    .unwrap();

    let response = server
        .post("/webhook")
        .add_header(stripe_signature(), signature_for(&payload))
        .bytes(payload.into())
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({"detail": "Invalid payload"}));
    assert!(store.orders().await.is_empty());
}

#[tokio::test]
async fn webhook_ignores_other_event_types() {
    let store = InMemoryOrderStore::new();
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(store.clone()),
        PersistencePolicy::Acknowledge,
    );

    for event_type in ["payment_intent.succeeded", "checkout.session.expired"] {
        let payload = serde_json::to_vec(&json!({
            "id": "evt_other",
            "type": event_type,
            "created": Utc::now().timestamp(),
            "data": { "object": { "id": "pi_123", "amount_total": 1500 } }
        }))
        .unwrap();

        let response = server
            .post("/webhook")
            .add_header(stripe_signature(), signature_for(&payload))
            .bytes(payload.into())
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!({"status": "ignored"}));
    }

    assert!(store.orders().await.is_empty());
}

#[tokio::test]
async fn webhook_acknowledges_when_store_fails() {
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(FailingStore),
        PersistencePolicy::Acknowledge,
    );

    let payload = completed_event(1500, json!({"name": "A", "address": "B", "phone": "C"}));
    let response = server
        .post("/webhook")
        .add_header(stripe_signature(), signature_for(&payload))
        .bytes(payload.into())
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"status": "success", "message": "Order saved"})
    );
}

#[tokio::test]
async fn webhook_reject_policy_surfaces_store_failure() {
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(FailingStore),
        PersistencePolicy::Reject,
    );

    let payload = completed_event(1500, json!({"name": "A", "address": "B", "phone": "C"}));
    let response = server
        .post("/webhook")
        .add_header(stripe_signature(), signature_for(&payload))
        .bytes(payload.into())
        .expect_failure()
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>(), json!({"detail": "Order not saved"}));
}

/// No dedup key exists: a redelivered event is inserted again.
#[tokio::test]
async fn webhook_redelivery_inserts_twice() {
    let store = InMemoryOrderStore::new();
    let server = server_with(
        Arc::new(StubStrategy::default()),
        Arc::new(store.clone()),
        PersistencePolicy::Acknowledge,
    );

    let payload = completed_event(1500, json!({"name": "A", "address": "B", "phone": "C"}));
    for _ in 0..2 {
        server
            .post("/webhook")
            .add_header(stripe_signature(), signature_for(&payload))
            .bytes(payload.clone().into())
            .await
            .assert_status_ok();
    }

    assert_eq!(store.orders().await.len(), 2);
}

#[tokio::test]
async fn checkout_to_order_round_trip_through_stripe() {
    let stripe = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(body_string_contains(
            "line_items%5B0%5D%5Bprice_data%5D%5Bunit_amount%5D=1500",
        ))
        .and(body_string_contains("line_items%5B0%5D%5Bquantity%5D=1"))
        .and(body_string_contains("metadata%5Bprice%5D=1500"))
        .and(body_string_contains("metadata%5Bphone%5D=C"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_live_flow",
            "url": "https://checkout.stripe.com/c/pay/cs_test_live_flow"
        })))
        .expect(1)
        .mount(&stripe)
        .await;

    let config = StripeConfig::new("sk_test_abc123", WEBHOOK_SECRET).with_api_base_url(stripe.uri());
    let strategy = StripeCheckoutStrategy::new(config).unwrap();
    let store = InMemoryOrderStore::new();
    let server = server_with(
        Arc::new(strategy),
        Arc::new(store.clone()),
        PersistencePolicy::Acknowledge,
    );

    let response = server
        .post("/create-checkout-session/")
        .json(&checkout_body())
        .await;
    assert_eq!(response.json::<Value>(), json!({"sessionId": "cs_test_live_flow"}));

    let request: CheckoutRequest = serde_json::from_value(checkout_body()).unwrap();
    let payload = completed_event(1500, json!(request.metadata()));
    let response = server
        .post("/webhook")
        .add_header(stripe_signature(), signature_for(&payload))
        .bytes(payload.into())
        .await;

    response.assert_status_ok();
    assert_eq!(
        store.orders().await,
        vec![OrderRecord::from_minor_units("A", "B", "C", 1500)]
    );
    assert_eq!(store.orders().await[0].price.to_string(), "15.00");
}
