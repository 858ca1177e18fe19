//! API error handling
//!
//! Maps core errors onto HTTP responses. Every error body carries the error
//! code and message; invalid transitions additionally carry the legal
//! successor set so the caller can retry correctly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cap_core::types::ProjectPhase;
use cap_core::CoreError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    Unauthorized(String),
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_targets: Option<Vec<ProjectPhase>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Core(err) => {
                let valid_targets = match err {
                    CoreError::InvalidTransition { valid, .. } => Some(valid.clone()),
                    _ => None,
                };
                let details = match err {
                    CoreError::Validation(errors) => Some(errors.full_messages()),
                    _ => None,
                };
                ErrorBody {
                    error: err.error_code(),
                    message: err.to_string(),
                    valid_targets,
                    details,
                }
            }
            ApiError::Unauthorized(message) => ErrorBody {
                error: "unauthorized",
                message: message.clone(),
                valid_targets: None,
                details: None,
            },
            ApiError::BadRequest(message) => ErrorBody {
                error: "bad_request",
                message: message.clone(),
                valid_targets: None,
                details: None,
            },
        };

        if status.is_server_error() {
            tracing::error!(%status, message = %body.message, "request failed");
        }

        (status, Json(body)).into_response()
    }
}
