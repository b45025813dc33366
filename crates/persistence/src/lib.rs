//! # Minibank Persistence
//!
//! Ledger Store for Minibank - SQLite via sqlx.
//!
//! The store exclusively owns all persisted rows: accounts, the append-only
//! transaction log, closure records, loans, and the customer directory
//! backing table. The engine layer operates on it only through repositories,
//! composing its writes inside explicit transactions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use minibank_persistence::{AccountRepo, Database};
//!
//! let db = Database::init("sqlite:minibank.db").await?;
//! let accounts = AccountRepo::list_all(db.pool()).await?;
//! ```

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::schema::{
    decimal_to_minor, minor_to_decimal, AccountRow, ClosureRecordRow, CustomerRow, LoanRow,
    TransactionLogRow,
};
pub use sqlite::{
    create_pool, create_schema, init_database, AccountRepo, ClosureRepo, CustomerRepo, LoanRepo,
    TransactionLogRepo,
};

use sqlx::SqlitePool;

/// Database facade over the SQLite pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to an existing database
    ///
    /// # Arguments
    /// * `db_url` - SQLite database URL (e.g., "sqlite:minibank.db")
    pub async fn new(db_url: &str) -> PersistenceResult<Self> {
        let pool = create_pool(db_url).await?;
        Ok(Self { pool })
    }

    /// Create the database if missing and bootstrap the ledger schema
    pub async fn init(db_url: &str) -> PersistenceResult<Self> {
        let pool = init_database(db_url).await?;
        Ok(Self { pool })
    }

    /// Get the SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
