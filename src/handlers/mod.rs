pub mod dashboard;
pub mod health;
pub mod response_config;
pub mod webhooks;

use crate::error::ApiError;

/// Fallback for routes that exist but don't accept the request's method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
