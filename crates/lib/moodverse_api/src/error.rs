//! Application error types.

use std::time::Duration;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use moodverse_core::PortraitError;
use serde::Serialize;
use thiserror::Error;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// JSON error body shared by every failure response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<String>,
}

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited: {message}")]
    RateLimited {
        message: &'static str,
        hint: Option<&'static str>,
        retry_after: Duration,
    },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, detail, retry_after) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, m.as_str(), None, None),
            AppError::RateLimited { message, hint, .. } => {
                (StatusCode::TOO_MANY_REQUESTS, *message, None, *hint)
            }
            AppError::Upstream(d) => (
                StatusCode::BAD_GATEWAY,
                "Failed to generate portrait. Please try again.",
                Some(d.clone()),
                None,
            ),
            AppError::Parse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid response from AI. Please try again.",
                None,
                None,
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large.",
                None,
                None,
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error. Please try again.",
                None,
                None,
            ),
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            detail,
            retry_after: retry_after.map(str::to_string),
        });
        let mut response = (status, body).into_response();
        if let AppError::RateLimited { retry_after, .. } = &self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs(*retry_after)));
        }
        response
    }
}

/// Whole seconds until retry, rounded up and never zero.
pub fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

impl From<PortraitError> for AppError {
    fn from(e: PortraitError) -> Self {
        match e {
            PortraitError::InvalidInput(msg) => AppError::Validation(msg),
            PortraitError::Upstream { detail, .. } => AppError::Upstream(detail),
            PortraitError::Parse(msg) => AppError::Parse(msg),
            PortraitError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::Validation("Invalid JSON body.".into())
        }
    }
}
