use serde::{Deserialize, Serialize};
use specta::Type;

use crate::types::WebhookRecord;

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct IngestAck {
    pub status: String,
    pub message: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct ListWebhooksResponse {
    pub webhooks: Vec<WebhookRecord>,
    pub count: usize,
    /// Identifiers read from the index before filtering.
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct ClearWebhooksResponse {
    pub status: String,
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct HealthResponse {
    pub status: String,
    pub redis: String,
}
