//! Customer directory interface
//!
//! The engine treats customer data as an external collaborator: all it ever
//! asks is whether a customer exists and how far their accounts may
//! overdraw. `SqliteCustomerDirectory` answers from the customers table in
//! the same database; a deployment with a separate directory service swaps
//! in its own implementation of the trait.

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use minibank_persistence::{minor_to_decimal, CustomerRepo};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

/// Customer existence checks and overdraft limit lookup.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn customer_exists(&self, customer_id: &str) -> EngineResult<bool>;

    /// Fails with `UnknownCustomer` when the id is not in the directory.
    async fn overdraft_limit(&self, customer_id: &str) -> EngineResult<Decimal>;
}

/// Directory backed by the ledger database's customers table.
pub struct SqliteCustomerDirectory {
    pool: SqlitePool,
}

impl SqliteCustomerDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerDirectory for SqliteCustomerDirectory {
    async fn customer_exists(&self, customer_id: &str) -> EngineResult<bool> {
        let row = CustomerRepo::find_by_id(&self.pool, customer_id).await?;
        Ok(row.is_some())
    }

    async fn overdraft_limit(&self, customer_id: &str) -> EngineResult<Decimal> {
        let row = CustomerRepo::find_by_id(&self.pool, customer_id)
            .await?
            .ok_or_else(|| EngineError::UnknownCustomer(customer_id.to_string()))?;
        Ok(minor_to_decimal(row.overdraft_limit_minor))
    }
}
