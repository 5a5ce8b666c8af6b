//! # pay-api
//!
//! HTTP API layer for checkout-bridge.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Hosted checkout session creation
//! - Stripe webhook handling that records completed orders
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/create-checkout-session/` | Create checkout session |
//! | POST | `/webhook` | Stripe webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, PersistencePolicy};
