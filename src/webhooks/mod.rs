mod config;
mod store;

pub use config::{DEFAULT_INDEX_CAP, DEFAULT_RECORD_TTL_SECS, RetentionConfig};
pub use store::{
    DEFAULT_LIST_LIMIT, INDEX_KEY, IncomingWebhook, ListWebhooksParams, ListWebhooksResult,
    MAX_LIST_LIMIT, RECORD_KEY_PREFIX, SortOrder, WebhookError, WebhookIdGenerator,
    clear_webhooks, ingest_webhook, list_webhooks,
};
