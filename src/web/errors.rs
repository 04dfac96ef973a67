//! # Web API Error Types
//!
//! HTTP mapping for callback and hearing-ingest failures. Validation failures
//! never reach this type: they travel inside a 200 response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::dispatch::DispatchError;
use crate::messaging::MessagingError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Service authorization required")]
    Unauthorized,

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("{message}")]
    UnhandledEvent { message: String },

    #[error("{message}")]
    HandlerFault { message: String },

    #[error("{message}")]
    DispatchTimeout { message: String },

    #[error("Service temporarily unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::UnhandledEvent { .. } | Self::HandlerFault { .. } | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::DispatchTimeout { .. } | Self::ServiceUnavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::UnhandledEvent { .. } => "UNHANDLED_EVENT",
            Self::HandlerFault { .. } => "HANDLER_FAULT",
            Self::DispatchTimeout { .. } => "DISPATCH_TIMEOUT",
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_response = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string()
            }
        });

        (self.status_code(), Json(error_response)).into_response()
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Unhandled { .. } => {
                // Deployment mismatch between the event catalogue and the registry.
                error!(error = %err, "Unhandled callback event");
                ApiError::UnhandledEvent {
                    message: err.to_string(),
                }
            }
            DispatchError::HandlerFault { .. } | DispatchError::HandlerPanicked { .. } => {
                ApiError::HandlerFault {
                    message: err.to_string(),
                }
            }
            DispatchError::Timeout { .. } => ApiError::DispatchTimeout {
                message: err.to_string(),
            },
            DispatchError::Aborted { .. } => ApiError::Internal,
        }
    }
}

impl From<MessagingError> for ApiError {
    fn from(err: MessagingError) -> Self {
        match err {
            MessagingError::MessageTooLarge { .. } => ApiError::bad_request(err.to_string()),
            other => ApiError::service_unavailable(other.to_string()),
        }
    }
}
