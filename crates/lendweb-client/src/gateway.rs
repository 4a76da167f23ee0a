//! Data-access component
//!
//! Every operation is a single request with no retry. The legacy ledger
//! signals the two known failures with plain-text sentinel bodies; they
//! are turned into `Reply::NotFound` here so callers never compare strings.

use crate::ClientError;
use async_trait::async_trait;
use lendweb_config::{ClientConfig, Protocol};
use lendweb_core::{
    codec, CoreError, LedgerEntry, LenderChangeInput, LenderName, LoanController, LoanInput,
    LENDER_NOT_FOUND_SENTINEL, LOAN_NOT_FOUND_SENTINEL,
};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a lookup that may legitimately miss
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Found(T),
    NotFound,
}

impl<T> Reply<T> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Reply::NotFound)
    }

    pub fn found(self) -> Option<T> {
        match self {
            Reply::Found(value) => Some(value),
            Reply::NotFound => None,
        }
    }
}

/// The four logical operations of the data-access component
#[async_trait]
pub trait LoanGateway: Send + Sync {
    async fn query_all_loan(&self) -> Result<Vec<LedgerEntry>, ClientError>;

    async fn query_loan(&self, id: &str) -> Result<Reply<Value>, ClientError>;

    async fn record_loan(&self, input: &LoanInput) -> Result<Value, ClientError>;

    async fn change_lender(&self, input: &LenderChangeInput) -> Result<Reply<Value>, ClientError>;
}

/// Request paths of the legacy routes
pub mod paths {
    use super::*;
    use std::fmt;

    /// Route prefix plus one free-form segment
    ///
    /// `Display` gives the path as the server sees it after decoding;
    /// `encoded` gives the form that goes on the wire.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct LegacyPath {
        prefix: &'static str,
        segment: String,
    }

    impl LegacyPath {
        fn new(prefix: &'static str, segment: impl Into<String>) -> Self {
            Self { prefix, segment: segment.into() }
        }

        pub fn encoded(&self) -> String {
            format!("{}{}", self.prefix, urlencoding::encode(&self.segment))
        }
    }

    impl fmt::Display for LegacyPath {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}{}", self.prefix, self.segment)
        }
    }

    pub fn get_all_loan() -> LegacyPath {
        LegacyPath::new("/get_all_loan/", "")
    }

    pub fn get_loan(id: &str) -> LegacyPath {
        LegacyPath::new("/get_loan/", id)
    }

    pub fn add_loan(input: &LoanInput) -> LegacyPath {
        LegacyPath::new("/add_loan/", codec::encode_loan_segment(input))
    }

    pub fn change_lender(input: &LenderChangeInput) -> LegacyPath {
        LegacyPath::new("/change_lender/", codec::encode_lender_segment(input))
    }
}

/// Parse a body as JSON, falling back to the raw text
pub fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Map a legacy body onto `Reply`, treating `sentinel` (bare or JSON-quoted) as a miss
pub fn classify_body(body: &str, sentinel: &str) -> Reply<Value> {
    match parse_body(body) {
        Value::String(ref text) if text == sentinel => Reply::NotFound,
        value => Reply::Found(value),
    }
}

// ==================== HTTP gateway ====================

/// Gateway talking to a loan service over HTTP
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    protocol: Protocol,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            protocol: config.protocol,
        })
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    fn legacy_url(&self, path: &paths::LegacyPath) -> String {
        format!("{}{}", self.base_url, path.encoded())
    }

    /// `/api/loans/<id>` with the id percent-encoded
    fn loan_url(&self, id: &str) -> String {
        format!("{}/api/loans/{}", self.base_url, urlencoding::encode(id))
    }

    /// A legacy miss: the sentinel body, or a 404 from a server running without sentinels
    fn classify_legacy(status: StatusCode, body: &str, sentinel: &str, url: &str) -> Result<Reply<Value>, ClientError> {
        if status == StatusCode::NOT_FOUND {
            return Ok(Reply::NotFound);
        }
        Self::expect_success(status, url)?;
        Ok(classify_body(body, sentinel))
    }

    async fn get_text(&self, url: &str) -> Result<(StatusCode, String), ClientError> {
        log::debug!(target: "lendweb::client", "GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        Ok((status, response.text().await?))
    }

    fn expect_success(status: StatusCode, url: &str) -> Result<(), ClientError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Status { status: status.as_u16(), url: url.to_string() })
        }
    }
}

#[async_trait]
impl LoanGateway for HttpGateway {
    async fn query_all_loan(&self) -> Result<Vec<LedgerEntry>, ClientError> {
        let url = match self.protocol {
            Protocol::Legacy => self.legacy_url(&paths::get_all_loan()),
            Protocol::Structured => format!("{}/api/loans", self.base_url),
        };
        let (status, body) = self.get_text(&url).await?;
        Self::expect_success(status, &url)?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn query_loan(&self, id: &str) -> Result<Reply<Value>, ClientError> {
        match self.protocol {
            Protocol::Legacy => {
                let url = self.legacy_url(&paths::get_loan(id));
                let (status, body) = self.get_text(&url).await?;
                Self::classify_legacy(status, &body, LOAN_NOT_FOUND_SENTINEL, &url)
            }
            Protocol::Structured => {
                let url = self.loan_url(id);
                let (status, body) = self.get_text(&url).await?;
                if status == StatusCode::NOT_FOUND {
                    return Ok(Reply::NotFound);
                }
                Self::expect_success(status, &url)?;
                Ok(Reply::Found(serde_json::from_str(&body)?))
            }
        }
    }

    async fn record_loan(&self, input: &LoanInput) -> Result<Value, ClientError> {
        match self.protocol {
            Protocol::Legacy => {
                let url = self.legacy_url(&paths::add_loan(input));
                let (status, body) = self.get_text(&url).await?;
                Self::expect_success(status, &url)?;
                Ok(parse_body(&body))
            }
            Protocol::Structured => {
                let url = format!("{}/api/loans", self.base_url);
                log::debug!(target: "lendweb::client", "POST {}", url);
                let response = self.client.post(&url).json(input).send().await?;
                Self::expect_success(response.status(), &url)?;
                Ok(response.json().await?)
            }
        }
    }

    async fn change_lender(&self, input: &LenderChangeInput) -> Result<Reply<Value>, ClientError> {
        match self.protocol {
            Protocol::Legacy => {
                let url = self.legacy_url(&paths::change_lender(input));
                let (status, body) = self.get_text(&url).await?;
                Self::classify_legacy(status, &body, LENDER_NOT_FOUND_SENTINEL, &url)
            }
            Protocol::Structured => {
                let url = format!("{}/lender", self.loan_url(&input.id));
                log::debug!(target: "lendweb::client", "PUT {}", url);
                let body = LenderName { name: input.name.clone() };
                let response = self.client.put(&url).json(&body).send().await?;
                if response.status() == StatusCode::NOT_FOUND {
                    return Ok(Reply::NotFound);
                }
                Self::expect_success(response.status(), &url)?;
                Ok(Reply::Found(response.json().await?))
            }
        }
    }
}

// ==================== In-process gateway ====================

/// Gateway calling a `LoanController` directly, without a network hop
#[derive(Clone)]
pub struct LocalGateway {
    controller: Arc<dyn LoanController>,
}

impl LocalGateway {
    pub fn new(controller: Arc<dyn LoanController>) -> Self {
        Self { controller }
    }
}

fn rejected(error: CoreError) -> ClientError {
    ClientError::Rejected { message: error.to_string() }
}

#[async_trait]
impl LoanGateway for LocalGateway {
    async fn query_all_loan(&self) -> Result<Vec<LedgerEntry>, ClientError> {
        self.controller.get_all_loan().await.map_err(rejected)
    }

    async fn query_loan(&self, id: &str) -> Result<Reply<Value>, ClientError> {
        match self.controller.get_loan(id).await {
            Ok(loan) => Ok(Reply::Found(serde_json::to_value(loan)?)),
            Err(CoreError::LoanNotFound { .. }) => Ok(Reply::NotFound),
            Err(e) => Err(rejected(e)),
        }
    }

    async fn record_loan(&self, input: &LoanInput) -> Result<Value, ClientError> {
        let receipt = self.controller.add_loan(input.to_new_loan()).await.map_err(rejected)?;
        Ok(serde_json::to_value(receipt)?)
    }

    async fn change_lender(&self, input: &LenderChangeInput) -> Result<Reply<Value>, ClientError> {
        match self.controller.change_lender(input.to_change()).await {
            Ok(receipt) => Ok(Reply::Found(serde_json::to_value(receipt)?)),
            Err(CoreError::LoanNotFound { .. }) => Ok(Reply::NotFound),
            Err(e) => Err(rejected(e)),
        }
    }
}
