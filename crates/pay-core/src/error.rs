//! # Payment Error Types
//!
//! Typed error handling for the checkout-bridge gateway.
//! All collaborator calls return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for session creation, webhook handling and persistence
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Webhook body is not a usable event (bad UTF-8, bad JSON, missing fields)
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Webhook signature header missing, stale or not matching
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with a collaborator
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Order insert into the data store failed
    #[error("Persistence error [{store}]: {message}")]
    Persistence { store: String, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Fixed client-facing detail for webhook verification failures.
    ///
    /// The provider only ever sees one of these two strings, never the
    /// internal reason.
    pub fn webhook_detail(&self) -> Option<&'static str> {
        match self {
            PaymentError::MalformedPayload(_) => Some("Invalid payload"),
            PaymentError::SignatureInvalid(_) => Some("Invalid signature"),
            _ => None,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::MalformedPayload(_) => 400,
            PaymentError::SignatureInvalid(_) => 400,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::NetworkError(_) => 503,
            PaymentError::Persistence { .. } => 500,
            PaymentError::Serialization(_) => 500,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
