use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::{
    response_config::ResponseConfigError,
    store::StoreError,
    types::{ApiErrorCode, ApiErrorResponse},
    webhooks::WebhookError,
};

#[derive(Debug)]
pub enum ApiError {
    MethodNotAllowed,
    BadRequest(String),
    Unauthorized(String),
    Store(StoreError),
    Serialization(serde_json::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::Store(err) => Self::Store(err),
            WebhookError::Serialization(err) => Self::Serialization(err),
        }
    }
}

impl From<ResponseConfigError> for ApiError {
    fn from(err: ResponseConfigError) -> Self {
        match err {
            ResponseConfigError::Store(err) => Self::Store(err),
            ResponseConfigError::Serialization(err) => Self::Serialization(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ApiErrorCode::MethodNotAllowed,
                "method not allowed".to_string(),
            ),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ApiErrorCode::Validation, message)
            }
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, ApiErrorCode::Unauthorized, message)
            }
            ApiError::Store(err) => {
                error!(error = %err, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::Store,
                    "store error".to_string(),
                )
            }
            ApiError::Serialization(err) => {
                error!(error = %err, "serialization failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::Serialization,
                    "serialization error".to_string(),
                )
            }
        };

        (status, Json(ApiErrorResponse { code, message })).into_response()
    }
}
