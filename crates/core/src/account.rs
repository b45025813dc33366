//! # Account Module
//!
//! Defines Account - a customer's ledger account with a balance, a status,
//! and (once closed) a closure reason. Balance arithmetic is exact decimal;
//! the Closed status is terminal and reached exactly once.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account operating normally
    Active,
    /// No activity for an extended period; still accepts transactions
    Dormant,
    /// Account closed - terminal, no further transactions
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Dormant => "dormant",
            AccountStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(AccountStatus::Active),
            "dormant" => Some(AccountStatus::Dormant),
            "closed" => Some(AccountStatus::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer's ledger account.
///
/// Invariants:
/// - `balance` is exact decimal (2 dp); never drifts through float rounding
/// - `reason_for_closure` is `Some` iff `status == Closed`
/// - Closed is terminal: the status never leaves it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Opaque stable identifier
    pub id: String,
    /// Owning customer in the customer directory
    pub customer_id: String,
    /// Current balance, 2 decimal places
    pub balance: Decimal,
    /// Account status
    pub status: AccountStatus,
    /// Set exactly when the account transitions to Closed (max 50 chars)
    pub reason_for_closure: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new Active account with the opening balance.
    pub fn open(id: String, customer_id: String, opening_balance: Decimal) -> CoreResult<Self> {
        if opening_balance < Decimal::ZERO {
            return Err(CoreError::InvalidAmount(opening_balance));
        }
        Ok(Self {
            id,
            customer_id,
            balance: opening_balance,
            status: AccountStatus::Active,
            reason_for_closure: None,
            created_at: Utc::now(),
        })
    }

    /// True unless the account is Closed.
    pub fn is_open(&self) -> bool {
        self.status != AccountStatus::Closed
    }

    /// Transition to Closed with a reason. Rejected if already Closed.
    pub fn close(&mut self, reason: &str) -> CoreResult<()> {
        if self.status == AccountStatus::Closed {
            return Err(CoreError::AlreadyClosed(self.id.clone()));
        }
        self.status = AccountStatus::Closed;
        self.reason_for_closure = Some(reason.to_string());
        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account {} (customer: {}, balance: {}, status: {})",
            self.id, self.customer_id, self.balance, self.status
        )
    }
}
