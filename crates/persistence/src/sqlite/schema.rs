//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables, plus the minor-unit
//! conversions at the row boundary.
//!
//! Money columns are INTEGER minor units (cents): SQLite adds integers
//! exactly, so the guarded balance updates in the repos never drift the way
//! TEXT or REAL arithmetic would. Loan rates are TEXT decimals - no SQL
//! arithmetic ever touches them.

use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, Utc};
use minibank_core::{
    Account, AccountStatus, ClosureRecord, Customer, Loan, TransactionLogEntry, TxType,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Convert a 2-dp decimal amount to integer cents.
///
/// Rejects values with more than 2 decimal places - rounding a caller's
/// amount would credit or debit money nobody asked for.
pub fn decimal_to_minor(value: Decimal) -> PersistenceResult<i64> {
    let normalized = value.normalize();
    if normalized.scale() > 2 {
        return Err(PersistenceError::InvalidDecimal(format!(
            "more than 2 decimal places: {value}"
        )));
    }
    (normalized * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| PersistenceError::InvalidDecimal(format!("out of range: {value}")))
}

/// Convert integer cents back to a 2-dp decimal.
pub fn minor_to_decimal(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

fn parse_status(value: &str) -> PersistenceResult<AccountStatus> {
    AccountStatus::from_str(value).ok_or_else(|| PersistenceError::InvalidEnumValue {
        field: "accounts.status".to_string(),
        value: value.to_string(),
    })
}

fn parse_tx_type(value: &str) -> PersistenceResult<TxType> {
    TxType::from_str(value).ok_or_else(|| PersistenceError::InvalidEnumValue {
        field: "transaction_log.tx_type".to_string(),
        value: value.to_string(),
    })
}

/// Row type for the `customers` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CustomerRow {
    pub id: String,
    pub name: String,
    pub overdraft_limit_minor: i64,
    pub created_at: DateTime<Utc>,
}

/// Row type for the `accounts` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AccountRow {
    pub id: String,
    pub customer_id: String,
    pub balance_minor: i64,
    pub status: String,
    pub reason_for_closure: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row type for the `transaction_log` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TransactionLogRow {
    pub id: i64,
    pub account_id: String,
    pub tx_type: String,
    pub amount_minor: i64,
    pub created_at: DateTime<Utc>,
}

/// Row type for the `closure_records` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ClosureRecordRow {
    pub id: i64,
    pub account_id: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Row type for the `loans` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LoanRow {
    pub id: String,
    pub customer_id: String,
    pub principal_minor: i64,
    pub total_payable_minor: i64,
    pub rate: String,
    pub duration_months: i64,
    pub created_at: DateTime<Utc>,
}

// === Conversion implementations ===

impl TryFrom<AccountRow> for Account {
    type Error = PersistenceError;

    fn try_from(row: AccountRow) -> PersistenceResult<Self> {
        Ok(Account {
            id: row.id,
            customer_id: row.customer_id,
            balance: minor_to_decimal(row.balance_minor),
            status: parse_status(&row.status)?,
            reason_for_closure: row.reason_for_closure,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&Account> for AccountRow {
    type Error = PersistenceError;

    fn try_from(account: &Account) -> PersistenceResult<Self> {
        Ok(Self {
            id: account.id.clone(),
            customer_id: account.customer_id.clone(),
            balance_minor: decimal_to_minor(account.balance)?,
            status: account.status.as_str().to_string(),
            reason_for_closure: account.reason_for_closure.clone(),
            created_at: account.created_at,
        })
    }
}

impl TryFrom<TransactionLogRow> for TransactionLogEntry {
    type Error = PersistenceError;

    fn try_from(row: TransactionLogRow) -> PersistenceResult<Self> {
        Ok(TransactionLogEntry {
            id: row.id,
            account_id: row.account_id,
            tx_type: parse_tx_type(&row.tx_type)?,
            amount: minor_to_decimal(row.amount_minor),
            created_at: row.created_at,
        })
    }
}

impl From<ClosureRecordRow> for ClosureRecord {
    fn from(row: ClosureRecordRow) -> Self {
        ClosureRecord {
            id: row.id,
            account_id: row.account_id,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            overdraft_limit: minor_to_decimal(row.overdraft_limit_minor),
            created_at: row.created_at,
        }
    }
}

impl TryFrom<&Customer> for CustomerRow {
    type Error = PersistenceError;

    fn try_from(customer: &Customer) -> PersistenceResult<Self> {
        Ok(Self {
            id: customer.id.clone(),
            name: customer.name.clone(),
            overdraft_limit_minor: decimal_to_minor(customer.overdraft_limit)?,
            created_at: customer.created_at,
        })
    }
}

impl TryFrom<LoanRow> for Loan {
    type Error = PersistenceError;

    fn try_from(row: LoanRow) -> PersistenceResult<Self> {
        let rate = Decimal::from_str(&row.rate)
            .map_err(|e| PersistenceError::InvalidDecimal(format!("loans.rate: {e}")))?;
        Ok(Loan {
            id: row.id,
            customer_id: row.customer_id,
            principal: minor_to_decimal(row.principal_minor),
            total_payable: minor_to_decimal(row.total_payable_minor),
            rate,
            duration_months: row.duration_months,
        })
    }
}

impl TryFrom<&Loan> for LoanRow {
    type Error = PersistenceError;

    fn try_from(loan: &Loan) -> PersistenceResult<Self> {
        Ok(Self {
            id: loan.id.clone(),
            customer_id: loan.customer_id.clone(),
            principal_minor: decimal_to_minor(loan.principal)?,
            total_payable_minor: decimal_to_minor(loan.total_payable)?,
            rate: loan.rate.to_string(),
            duration_months: loan.duration_months,
            created_at: Utc::now(),
        })
    }
}
