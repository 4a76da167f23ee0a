//! Presentation controller
//!
//! Each user action takes the current `ViewState` and returns the next
//! one. A transport failure is logged and hands back the state it was
//! given, so the page keeps showing whatever it showed before.

use crate::{ClientError, LoanGateway, Reply};
use lendweb_core::{LedgerEntry, LenderChangeInput, LoanInput};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::num::IntErrorKind;
use std::sync::Arc;

/// A "list all" item ready for display: numeric key plus the flattened record fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanRecord {
    /// `None` when the raw key has no leading digits
    #[serde(rename = "Key")]
    pub key: Option<i64>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LoanRecord {
    pub fn from_entry(entry: LedgerEntry) -> Self {
        let fields = match entry.record {
            Value::Object(mut map) => {
                map.remove("Key");
                map
            }
            other => {
                let mut map = Map::new();
                map.insert("Record".to_string(), other);
                map
            }
        };

        Self {
            key: parse_key(&entry.key),
            fields,
        }
    }

    /// Field value as display text
    pub fn field(&self, name: &str) -> String {
        match self.fields.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// Integer prefix of a key: optional whitespace, optional sign, digits
///
/// `"12"` -> 12, `" 7abc"` -> 7, `"abc"` -> None. Prefixes beyond the
/// `i64` range saturate, so they still sort after (or before) every
/// in-range key.
pub fn parse_key(raw: &str) -> Option<i64> {
    static KEY_PREFIX: OnceCell<Regex> = OnceCell::new();
    let re = KEY_PREFIX.get_or_init(|| Regex::new(r"^\s*([+-]?[0-9]+)").unwrap());
    let digits = re.captures(raw)?.get(1)?.as_str();
    match digits.parse::<i64>() {
        Ok(key) => Some(key),
        Err(e) => match e.kind() {
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => Some(i64::MAX),
        },
    }
}

/// Numeric keys ascending, unparseable keys after all numeric ones
fn compare_keys(a: &Option<i64>, b: &Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Convert raw entries and sort them by key; the sort is stable
pub fn build_loan_list(entries: Vec<LedgerEntry>) -> Vec<LoanRecord> {
    let mut records: Vec<LoanRecord> = entries.into_iter().map(LoanRecord::from_entry).collect();
    records.sort_by(|a, b| compare_keys(&a.key, &b.key));
    records
}

/// Visibility of the four status banners
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Banners {
    /// Lender change accepted
    pub success_holder: bool,
    /// Loan recorded
    pub success_create: bool,
    /// Lender change hit a missing loan
    pub error_holder: bool,
    /// Single-loan query hit a missing loan
    pub error_query: bool,
}

/// Everything the page shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub all_loan: Vec<LoanRecord>,
    pub query_loan: Option<Reply<Value>>,
    pub create_loan: Option<Value>,
    pub change_lender: Option<Reply<Value>>,
    pub banners: Banners,
}

impl ViewState {
    pub fn with_all_loan(mut self, entries: Vec<LedgerEntry>) -> Self {
        self.all_loan = build_loan_list(entries);
        self
    }

    pub fn with_query_loan(mut self, reply: Reply<Value>) -> Self {
        self.banners.error_query = reply.is_not_found();
        self.query_loan = Some(reply);
        self
    }

    /// The success banner stays up once any confirmation has arrived
    pub fn with_created_loan(mut self, confirmation: Value) -> Self {
        self.create_loan = Some(confirmation);
        self.banners.success_create = true;
        self
    }

    pub fn with_lender_change(mut self, reply: Reply<Value>) -> Self {
        let missing = reply.is_not_found();
        self.banners.error_holder = missing;
        self.banners.success_holder = !missing;
        self.change_lender = Some(reply);
        self
    }
}

/// Outcome of one user action
///
/// `Unchanged` carries the state the action was given, untouched, after
/// the gateway call failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Applied(ViewState),
    Unchanged(ViewState),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }

    pub fn into_state(self) -> ViewState {
        match self {
            Transition::Applied(state) | Transition::Unchanged(state) => state,
        }
    }
}

/// Runs user actions against a gateway
#[derive(Clone)]
pub struct Presenter {
    gateway: Arc<dyn LoanGateway>,
}

impl Presenter {
    pub fn new(gateway: Arc<dyn LoanGateway>) -> Self {
        Self { gateway }
    }

    fn keep_on_failure(action: &str, state: ViewState, error: ClientError) -> Transition {
        log::warn!(target: "lendweb::presenter", "{} failed, view left unchanged: {}", action, error);
        Transition::Unchanged(state)
    }

    pub async fn query_all_loan(&self, state: ViewState) -> Transition {
        match self.gateway.query_all_loan().await {
            Ok(entries) => Transition::Applied(state.with_all_loan(entries)),
            Err(e) => Self::keep_on_failure("query all loans", state, e),
        }
    }

    pub async fn query_loan(&self, state: ViewState, id: &str) -> Transition {
        match self.gateway.query_loan(id).await {
            Ok(reply) => Transition::Applied(state.with_query_loan(reply)),
            Err(e) => Self::keep_on_failure("query loan", state, e),
        }
    }

    pub async fn record_loan(&self, state: ViewState, input: &LoanInput) -> Transition {
        match self.gateway.record_loan(input).await {
            Ok(confirmation) => Transition::Applied(state.with_created_loan(confirmation)),
            Err(e) => Self::keep_on_failure("record loan", state, e),
        }
    }

    pub async fn change_lender(&self, state: ViewState, input: &LenderChangeInput) -> Transition {
        match self.gateway.change_lender(input).await {
            Ok(reply) => Transition::Applied(state.with_lender_change(reply)),
            Err(e) => Self::keep_on_failure("change lender", state, e),
        }
    }
}
