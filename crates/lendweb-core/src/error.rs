//! Error types for lendweb-core
//!
//! Errors carry a stable code and severity so the API layer can map them
//! to status codes and JSON bodies without matching on messages.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No loan stored under the key
    LoanNotFound,
    /// Path segment split into the wrong number of fields
    ArgumentCount,
    /// Path segment could not be decoded at all
    InvalidSegment,
    /// Key the ledger refuses to store
    InvalidKey,
    InternalError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Expected outcome, e.g. a lookup miss
    Info,
    /// Caller sent something unusable
    Warning,
    /// Operation failed on our side
    Error,
}

/// JSON body of an error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Loan not found: {id}")]
    LoanNotFound { id: String },

    #[error("Incorrect number of arguments. Expecting {expected}, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("Invalid path segment: {message}")]
    InvalidSegment { message: String },

    #[error("Invalid key: {key:?}")]
    InvalidKey { key: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::LoanNotFound { .. } => ErrorCode::LoanNotFound,
            CoreError::ArgumentCount { .. } => ErrorCode::ArgumentCount,
            CoreError::InvalidSegment { .. } => ErrorCode::InvalidSegment,
            CoreError::InvalidKey { .. } => ErrorCode::InvalidKey,
            CoreError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::LoanNotFound { .. } => ErrorSeverity::Info,
            CoreError::Internal { .. } => ErrorSeverity::Error,
            _ => ErrorSeverity::Warning,
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        let (details, hint) = match self {
            CoreError::LoanNotFound { id } => (
                Some(json!({ "id": id })),
                Some("GET /api/loans lists the stored keys"),
            ),
            CoreError::ArgumentCount { expected, actual } => (
                Some(json!({ "expected": expected, "actual": actual })),
                Some("field values may not contain '-'; POST /api/loans accepts any text"),
            ),
            CoreError::InvalidKey { .. } => (None, Some("loan ids must not be empty")),
            _ => (None, None),
        };

        ErrorDetails {
            code: self.code(),
            message: self.to_string(),
            details,
            hint,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
