//! Error types for lendweb-client

use thiserror::Error;

/// Failure to obtain a usable response
///
/// Known "not found" outcomes are not errors; they arrive as `Reply::NotFound`.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Malformed response body: {message}")]
    Decode { message: String },

    #[error("Rejected by the ledger: {message}")]
    Rejected { message: String },
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        ClientError::Decode { message: error.to_string() }
    }
}
