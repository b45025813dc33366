//! # Ledger Module
//!
//! Append-only records: transaction log entries and closure records.
//! Both are immutable once written - the store never updates or deletes them.
//! Log entry ids are assigned by the store in insertion order, so ordering a
//! single account's entries by id orders them by commit time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Deposit,
    Withdrawal,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Deposit => "deposit",
            TxType::Withdrawal => "withdrawal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(TxType::Deposit),
            "withdrawal" => Some(TxType::Withdrawal),
            _ => None,
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One committed deposit or withdrawal against an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLogEntry {
    /// Store-assigned id, monotonically increasing per insertion
    pub id: i64,
    /// Account the entry belongs to
    pub account_id: String,
    /// Deposit or Withdrawal
    pub tx_type: TxType,
    /// Positive amount, 2 decimal places
    pub amount: Decimal,
    /// Commit time
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for TransactionLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} on {}",
            self.id, self.tx_type, self.amount, self.account_id
        )
    }
}

/// Audit record written exactly once when an account is closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureRecord {
    pub id: i64,
    pub account_id: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for ClosureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} closed: {}",
            self.id, self.account_id, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_type_round_trip() {
        assert_eq!(TxType::from_str("deposit"), Some(TxType::Deposit));
        assert_eq!(TxType::from_str("Withdrawal"), Some(TxType::Withdrawal));
        assert_eq!(TxType::from_str("transfer"), None);
        assert_eq!(TxType::Deposit.as_str(), "deposit");
    }
}
