//! Ledger collaborator
//!
//! The route table forwards every request to a `LoanController`. The
//! in-memory implementation keeps loans in a key-ordered map and scans
//! a configured lexicographic key range for "list all".

use crate::{CoreError, CoreResult, LedgerEntry, LenderChange, Loan, NewLoan, Receipt};
use async_trait::async_trait;
use lendweb_config::LedgerConfig;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// The four operations the route table dispatches to
#[async_trait]
pub trait LoanController: Send + Sync {
    /// Look up one loan by key
    async fn get_loan(&self, id: &str) -> CoreResult<Loan>;

    /// Write a loan under its key, replacing any previous value
    async fn add_loan(&self, new_loan: NewLoan) -> CoreResult<Receipt>;

    /// All loans in the scanned key range, in key order
    async fn get_all_loan(&self) -> CoreResult<Vec<LedgerEntry>>;

    /// Re-assign the lender of an existing loan
    async fn change_lender(&self, change: LenderChange) -> CoreResult<Receipt>;
}

/// Key-ordered in-memory ledger
pub struct InMemoryLedger {
    loans: RwLock<BTreeMap<String, Loan>>,
    range_start: String,
    range_end: String,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}

impl InMemoryLedger {
    /// Create an empty ledger scanning `[range_start, range_end)`
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            loans: RwLock::new(BTreeMap::new()),
            range_start: config.range_start.clone(),
            range_end: config.range_end.clone(),
        }
    }

    /// Create a ledger, seeded with sample loans when the config asks for it
    pub fn from_config(config: &LedgerConfig) -> Self {
        if config.seed_demo_data {
            Self::with_demo_data(config)
        } else {
            Self::new(config)
        }
    }

    /// Create a ledger holding eight sample loans under keys "1" to "8"
    pub fn with_demo_data(config: &LedgerConfig) -> Self {
        let seed = [
            ("Arnold", "1504054225", "Irene"),
            ("Bob", "1504057825", "Jenny"),
            ("Calvin", "1493517025", "Kathy"),
            ("David", "1496105425", "Leslie"),
            ("Edward", "1493512301", "Mike"),
            ("Frankie", "1494117101", "Norman"),
            ("Gloria", "1496104301", "Oslen"),
            ("Helen", "1485066691", "Patrick"),
        ];

        let loans = seed
            .iter()
            .enumerate()
            .map(|(i, (vessel, timestamp, lender))| {
                let loan = Loan {
                    vessel: vessel.to_string(),
                    location: "0, 0".to_string(),
                    timestamp: timestamp.to_string(),
                    lender: lender.to_string(),
                };
                ((i + 1).to_string(), loan)
            })
            .collect::<BTreeMap<_, _>>();

        log::debug!(target: "lendweb::ledger", "Seeded {} demo loans", loans.len());

        Self {
            loans: RwLock::new(loans),
            range_start: config.range_start.clone(),
            range_end: config.range_end.clone(),
        }
    }

    /// Number of stored loans, including keys outside the scanned range
    pub async fn len(&self) -> usize {
        self.loans.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.loans.read().await.is_empty()
    }
}

#[async_trait]
impl LoanController for InMemoryLedger {
    async fn get_loan(&self, id: &str) -> CoreResult<Loan> {
        let loans = self.loans.read().await;
        loans
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::LoanNotFound { id: id.to_string() })
    }

    async fn add_loan(&self, new_loan: NewLoan) -> CoreResult<Receipt> {
        if new_loan.id.is_empty() {
            return Err(CoreError::InvalidKey { key: new_loan.id });
        }

        let receipt = Receipt::new(&new_loan.id);
        let mut loans = self.loans.write().await;
        if loans.insert(new_loan.id.clone(), new_loan.loan).is_some() {
            log::info!(target: "lendweb::ledger", "Replaced loan {} (tx {})", new_loan.id, receipt.tx_id);
        } else {
            log::info!(target: "lendweb::ledger", "Recorded loan {} (tx {})", new_loan.id, receipt.tx_id);
        }
        Ok(receipt)
    }

    async fn get_all_loan(&self) -> CoreResult<Vec<LedgerEntry>> {
        // BTreeMap::range panics on an inverted range
        if self.range_start >= self.range_end {
            return Ok(Vec::new());
        }

        let loans = self.loans.read().await;
        loans
            .range(self.range_start.clone()..self.range_end.clone())
            .map(|(key, loan)| {
                let record = serde_json::to_value(loan).map_err(|e| CoreError::Internal {
                    message: e.to_string(),
                })?;
                Ok(LedgerEntry { key: key.clone(), record })
            })
            .collect()
    }

    async fn change_lender(&self, change: LenderChange) -> CoreResult<Receipt> {
        let mut loans = self.loans.write().await;
        let loan = loans
            .get_mut(&change.id)
            .ok_or_else(|| CoreError::LoanNotFound { id: change.id.clone() })?;

        let receipt = Receipt::new(&change.id);
        log::info!(
            target: "lendweb::ledger",
            "Lender of loan {} changed from {} to {} (tx {})",
            change.id, loan.lender, change.lender, receipt.tx_id
        );
        loan.lender = change.lender;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_loan(id: &str, lender: &str) -> NewLoan {
        NewLoan {
            id: id.to_string(),
            loan: Loan {
                vessel: "Aurora".to_string(),
                location: "10, 20".to_string(),
                timestamp: "1504054225".to_string(),
                lender: lender.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_demo_data() {
        let ledger = InMemoryLedger::with_demo_data(&LedgerConfig::default());
        assert_eq!(ledger.len().await, 8);
        assert_eq!(ledger.get_loan("1").await.unwrap().lender, "Irene");
        assert_eq!(ledger.get_loan("8").await.unwrap().vessel, "Helen");
    }

    #[tokio::test]
    async fn test_from_config_respects_seed_flag() {
        let config = LedgerConfig { seed_demo_data: false, ..LedgerConfig::default() };
        assert!(InMemoryLedger::from_config(&config).is_empty().await);
    }

    #[tokio::test]
    async fn test_get_missing_loan() {
        let ledger = InMemoryLedger::default();
        let err = ledger.get_loan("42").await.unwrap_err();
        assert_eq!(err, CoreError::LoanNotFound { id: "42".to_string() });
    }

    #[tokio::test]
    async fn test_add_then_get() {
        let ledger = InMemoryLedger::default();
        let receipt = ledger.add_loan(new_loan("5", "Irene")).await.unwrap();
        assert_eq!(receipt.key, "5");
        assert_eq!(ledger.get_loan("5").await.unwrap().lender, "Irene");

        // a second write replaces the first
        ledger.add_loan(new_loan("5", "Jenny")).await.unwrap();
        assert_eq!(ledger.get_loan("5").await.unwrap().lender, "Jenny");
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn test_add_rejects_empty_key() {
        let ledger = InMemoryLedger::default();
        assert!(matches!(
            ledger.add_loan(new_loan("", "Irene")).await,
            Err(CoreError::InvalidKey { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_all_scans_lexicographic_range() {
        let ledger = InMemoryLedger::default();
        for id in ["2", "10", "999", "abc"] {
            ledger.add_loan(new_loan(id, "Irene")).await.unwrap();
        }

        let keys: Vec<String> = ledger
            .get_all_loan()
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.key)
            .collect();

        // "999" is the exclusive end and "abc" sorts after it
        assert_eq!(keys, vec!["10", "2"]);
    }

    #[tokio::test]
    async fn test_get_all_record_shape() {
        let ledger = InMemoryLedger::default();
        ledger.add_loan(new_loan("3", "Kathy")).await.unwrap();
        let entries = ledger.get_all_loan().await.unwrap();
        assert_eq!(entries[0].record["lender"], "Kathy");
        assert_eq!(entries[0].record["location"], "10, 20");
    }

    #[tokio::test]
    async fn test_change_lender() {
        let ledger = InMemoryLedger::default();
        ledger.add_loan(new_loan("1", "Irene")).await.unwrap();

        let change = LenderChange { id: "1".to_string(), lender: "Bob".to_string() };
        ledger.change_lender(change).await.unwrap();
        assert_eq!(ledger.get_loan("1").await.unwrap().lender, "Bob");

        let missing = LenderChange { id: "9".to_string(), lender: "Bob".to_string() };
        assert!(matches!(
            ledger.change_lender(missing).await,
            Err(CoreError::LoanNotFound { .. })
        ));
    }
}
