//! # pay-supabase
//!
//! Order persistence for checkout-bridge.
//!
//! Completed checkouts are written as one row each into a Supabase table
//! (default `Orders`) with the columns `full_name`, `full_address`,
//! `phone` and `price`.
//!
//! ```rust,ignore
//! use pay_supabase::SupabaseOrderStore;
//! use pay_core::{OrderRecord, OrderStore};
//!
//! let store = SupabaseOrderStore::from_env()?;
//! store.insert_order(&OrderRecord::from_minor_units("Ada", "1 Loop Rd", "555-0100", 1500)).await?;
//! ```

pub mod config;
pub mod store;

pub use config::SupabaseConfig;
pub use store::{InMemoryOrderStore, SupabaseOrderStore};
