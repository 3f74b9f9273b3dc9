pub mod api_error;
pub mod response_config;
pub mod webhook_record;
pub mod webhooks;

#[allow(unused_imports)]
pub use api_error::{ApiErrorCode, ApiErrorResponse};
#[allow(unused_imports)]
pub use response_config::{ResponseConfig, SetResponseConfigResponse};
#[allow(unused_imports)]
pub use webhook_record::{BodyEncoding, WebhookRecord};
#[allow(unused_imports)]
pub use webhooks::{ClearWebhooksResponse, HealthResponse, IngestAck, ListWebhooksResponse};
