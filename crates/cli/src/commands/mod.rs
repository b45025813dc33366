//! CLI command handlers

pub mod account;
pub mod customer;
pub mod ledger;

use minibank_engine::{SqliteCustomerDirectory, TransactionEngine};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Build the engine over the connected pool, with the directory backed by
/// the same database's customers table.
pub fn engine_for(pool: &SqlitePool) -> TransactionEngine {
    let directory = Arc::new(SqliteCustomerDirectory::new(pool.clone()));
    TransactionEngine::new(pool.clone(), directory)
}
