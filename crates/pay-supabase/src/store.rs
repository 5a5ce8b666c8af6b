//! # Order Stores
//!
//! `OrderStore` implementations: Supabase (PostgREST over HTTPS) for real
//! deployments and an in-memory store for tests and dry runs.

use crate::config::SupabaseConfig;
use async_trait::async_trait;
use pay_core::{OrderRecord, OrderStore, PaymentError, PaymentResult};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

/// Writes orders into a Supabase table through the REST API
pub struct SupabaseOrderStore {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseOrderStore {
    pub fn new(config: SupabaseConfig) -> PaymentResult<Self> {
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
        let config = SupabaseConfig::from_env()?;
        Self::new(config)
    }

    fn persistence_error(message: impl Into<String>) -> PaymentError {
        PaymentError::Persistence {
            store: "supabase".to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl OrderStore for SupabaseOrderStore {
    #[instrument(skip(self, order), fields(table = %self.config.orders_table))]
    async fn insert_order(&self, order: &OrderRecord) -> PaymentResult<()> {
        let url = self.config.table_url(&self.config.orders_table);

        debug!("Inserting order: price={}", order.price);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", self.config.auth_header())
            .header("Prefer", "return=minimal")
            .json(order)
            .send()
            .await
            .map_err(|e| Self::persistence_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Supabase insert failed: status={}, body={}", status, body);
            return Err(Self::persistence_error(format!("HTTP {}: {}", status, body)));
        }

        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "supabase"
    }
}

/// Keeps orders in memory; nothing survives a restart
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<Mutex<Vec<OrderRecord>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every inserted order, in insert order
    pub async fn orders(&self) -> Vec<OrderRecord> {
        self.orders.lock().await.clone()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert_order(&self, order: &OrderRecord) -> PaymentResult<()> {
        self.orders.lock().await.push(order.clone());
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
