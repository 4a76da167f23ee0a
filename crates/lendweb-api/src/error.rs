//! Error types for lendweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lendweb_core::{CoreError, ErrorCode, ErrorSeverity};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(error) => match error.code() {
                ErrorCode::LoanNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ArgumentCount | ErrorCode::InvalidSegment | ErrorCode::InvalidKey => {
                    StatusCode::BAD_REQUEST
                }
                ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ApiError::Core(error) => serde_json::to_value(error.to_details())
                .unwrap_or_else(|_| serde_json::json!({ "message": error.to_string() })),
            ApiError::NotFound { .. } => {
                serde_json::json!({ "code": "NOT_FOUND", "message": self.to_string() })
            }
            ApiError::BadRequest { .. } => {
                serde_json::json!({ "code": "BAD_REQUEST", "message": self.to_string() })
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Core(ref error) if error.severity() == ErrorSeverity::Error => {
                log::error!(target: "lendweb::api", "{}", self)
            }
            ApiError::Core(ref error) if error.severity() == ErrorSeverity::Warning => {
                log::warn!(target: "lendweb::api", "{} -> {}", self, status)
            }
            _ => log::debug!(target: "lendweb::api", "{} -> {}", self, status),
        }
        (status, Json(self.body())).into_response()
    }
}
