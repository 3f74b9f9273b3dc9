use std::sync::Arc;

use crate::{
    store::RecordStore,
    webhooks::{RetentionConfig, WebhookIdGenerator},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub retention: RetentionConfig,
    pub ids: Arc<WebhookIdGenerator>,
    /// Bearer token for admin writes; `None` leaves them open.
    pub admin_api_token: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, retention: RetentionConfig) -> Self {
        Self {
            store,
            retention,
            ids: Arc::new(WebhookIdGenerator::new()),
            admin_api_token: None,
        }
    }

    pub fn with_admin_api_token(mut self, token: Option<String>) -> Self {
        self.admin_api_token = token.filter(|token| !token.is_empty());
        self
    }
}
