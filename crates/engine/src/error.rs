//! Engine layer errors
//!
//! The caller-visible error kinds of the transaction engine. Every error is
//! reported synchronously and leaves the store unchanged: validation errors
//! fire before any mutation begins, and anything raised mid-transaction
//! rolls the whole transaction back.

use minibank_core::CoreError;
use minibank_persistence::PersistenceError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Transaction engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    // === Validation errors ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Invalid closure reason: {0}")]
    InvalidReason(String),

    // === Precondition errors ===
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account is closed: {0}")]
    AccountClosed(String),

    #[error("Account already closed: {0}")]
    AlreadyClosed(String),

    #[error("Insufficient funds: requested {requested}, available {available} (overdraft limit {overdraft_limit})")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
        overdraft_limit: Decimal,
    },

    #[error("Unknown customer: {0}")]
    UnknownCustomer(String),

    // === Store errors ===
    #[error("Concurrent update conflict, retry the operation: {0}")]
    ConcurrencyConflict(String),

    #[error("Persistence error: {0}")]
    Persistence(PersistenceError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// The operation rolled back cleanly and may be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict(_))
    }
}

impl From<PersistenceError> for EngineError {
    fn from(err: PersistenceError) -> Self {
        if err.is_busy() {
            Self::ConcurrencyConflict(err.to_string())
        } else {
            Self::Persistence(err)
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        Self::from(PersistenceError::from(err))
    }
}
