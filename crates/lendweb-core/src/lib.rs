//! Loan domain types, the hyphen path-segment codec and the ledger collaborator
//!
//! - `codec`: encoding and decoding of the `/add_loan/:loan` and
//!   `/change_lender/:lender` path segments
//! - `ledger`: the `LoanController` contract and an in-memory implementation

pub mod codec;
pub mod error;
pub mod ledger;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use ledger::{InMemoryLedger, LoanController};

/// Body returned by the legacy "get one" route when the key is missing
pub const LOAN_NOT_FOUND_SENTINEL: &str = "Could not locate loan";

/// Body returned by the legacy "change lender" route when the key is missing
pub const LENDER_NOT_FOUND_SENTINEL: &str = "Error: no loan found";

/// A loan as stored in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub vessel: String,
    pub location: String,
    pub timestamp: String,
    pub lender: String,
}

/// A loan to be written under `id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub id: String,
    pub loan: Loan,
}

/// Lender re-assignment for the loan stored under `id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LenderChange {
    pub id: String,
    pub lender: String,
}

/// Form input for recording a loan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInput {
    pub id: String,
    pub longitude: String,
    pub latitude: String,
    pub timestamp: String,
    pub lender: String,
    pub vessel: String,
}

impl LoanInput {
    /// `longitude, latitude`
    pub fn location(&self) -> String {
        format!("{}, {}", self.longitude, self.latitude)
    }

    pub fn to_new_loan(&self) -> NewLoan {
        NewLoan {
            id: self.id.clone(),
            loan: Loan {
                vessel: self.vessel.clone(),
                location: self.location(),
                timestamp: self.timestamp.clone(),
                lender: self.lender.clone(),
            },
        }
    }
}

/// Form input for changing a loan's lender
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LenderChangeInput {
    pub id: String,
    pub name: String,
}

impl LenderChangeInput {
    pub fn to_change(&self) -> LenderChange {
        LenderChange {
            id: self.id.clone(),
            lender: self.name.clone(),
        }
    }
}

/// Body of `PUT /api/loans/:id/lender`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LenderName {
    pub name: String,
}

/// One item of the "list all" response: `{"Key": "3", "Record": {...}}`
///
/// `Record` is opaque to the client; it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: serde_json::Value,
}

/// Confirmation payload for writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: String,
    pub key: String,
    pub recorded_at: DateTime<Utc>,
}

impl Receipt {
    pub fn new(key: &str) -> Self {
        Self {
            tx_id: lendweb_utils::generate_tx_id(),
            key: key.to_string(),
            recorded_at: Utc::now(),
        }
    }
}
