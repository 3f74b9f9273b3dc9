//! Webhook receiver: stores inbound POSTs in Redis with a 24h TTL, keeps a
//! bounded recency index, and answers each sender with an operator-configured
//! synthetic response.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response_config;
pub mod server;
pub mod state;
pub mod store;
pub mod types;
pub mod webhooks;

pub use server::{create_router, start_server};
pub use state::AppState;
