//! Repository implementations for SQLite
//!
//! Every method is generic over `SqliteExecutor`, so the same call works
//! against the pool for one-shot reads and against `&mut *tx` when the
//! engine composes several writes into a single transaction.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use chrono::{DateTime, Utc};
use minibank_core::{Account, ClosureRecord, Customer, Loan, TransactionLogEntry, TxType};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteExecutor, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Customer Repository
// ============================================================================

/// Repository for the customers table
pub struct CustomerRepo;

impl CustomerRepo {
    /// Fetch a customer by ID
    pub async fn find_by_id<'e, E>(ex: E, id: &str) -> PersistenceResult<Option<CustomerRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let row = sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(ex)
            .await?;
        Ok(row)
    }

    /// Insert a new customer
    pub async fn insert<'e, E>(ex: E, customer: &Customer) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let row = CustomerRow::try_from(customer)?;
        sqlx::query(
            "INSERT INTO customers (id, name, overdraft_limit_minor, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.name)
        .bind(row.overdraft_limit_minor)
        .bind(row.created_at)
        .execute(ex)
        .await?;
        Ok(())
    }

    /// All customers, ordered by ID
    pub async fn list_all<'e, E>(ex: E) -> PersistenceResult<Vec<CustomerRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers ORDER BY id")
            .fetch_all(ex)
            .await?;
        Ok(rows)
    }
}

// ============================================================================
// Account Repository
// ============================================================================

/// Repository for the accounts table
pub struct AccountRepo;

impl AccountRepo {
    /// Fetch an account by ID
    pub async fn find_by_id<'e, E>(ex: E, id: &str) -> PersistenceResult<Option<AccountRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(ex)
            .await?;
        Ok(row)
    }

    /// Insert a new account
    pub async fn insert<'e, E>(ex: E, account: &Account) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let row = AccountRow::try_from(account)?;
        sqlx::query(
            r#"
            INSERT INTO accounts (id, customer_id, balance_minor, status, reason_for_closure, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.customer_id)
        .bind(row.balance_minor)
        .bind(&row.status)
        .bind(&row.reason_for_closure)
        .bind(row.created_at)
        .execute(ex)
        .await?;
        Ok(())
    }

    /// Apply a balance delta (cents) in one guarded UPDATE.
    ///
    /// The guard checks the account is not closed and, when `floor_minor` is
    /// given, that the resulting balance stays at or above it. The check and
    /// the write are a single statement, so no concurrent operation can act
    /// on an intermediate balance. Returns the number of rows changed:
    /// 1 means applied, 0 means some guard failed (caller inspects the row
    /// to find out which).
    pub async fn apply_delta<'e, E>(
        ex: E,
        id: &str,
        delta_minor: i64,
        floor_minor: Option<i64>,
    ) -> PersistenceResult<u64>
    where
        E: SqliteExecutor<'e>,
    {
        let result = match floor_minor {
            Some(floor) => {
                sqlx::query(
                    r#"
                    UPDATE accounts SET balance_minor = balance_minor + ?1
                    WHERE id = ?2 AND status != 'closed' AND balance_minor + ?1 >= ?3
                    "#,
                )
                .bind(delta_minor)
                .bind(id)
                .bind(floor)
                .execute(ex)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE accounts SET balance_minor = balance_minor + ?1
                    WHERE id = ?2 AND status != 'closed'
                    "#,
                )
                .bind(delta_minor)
                .bind(id)
                .execute(ex)
                .await?
            }
        };
        Ok(result.rows_affected())
    }

    /// Flip status to closed and set the reason, guarded against repeat
    /// closes. Returns rows changed (0 when the account was already closed
    /// or does not exist).
    pub async fn mark_closed<'e, E>(ex: E, id: &str, reason: &str) -> PersistenceResult<u64>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET status = 'closed', reason_for_closure = ?2
            WHERE id = ?1 AND status != 'closed'
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(ex)
        .await?;
        Ok(result.rows_affected())
    }

    /// All accounts, ordered by creation time
    pub async fn list_all<'e, E>(ex: E) -> PersistenceResult<Vec<AccountRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows =
            sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts ORDER BY created_at, id")
                .fetch_all(ex)
                .await?;
        Ok(rows)
    }
}

// ============================================================================
// Transaction Log Repository
// ============================================================================

/// Repository for the transaction_log table (append-only)
pub struct TransactionLogRepo;

impl TransactionLogRepo {
    /// Append one entry; the store assigns the id. Entries are never
    /// updated or deleted.
    pub async fn append<'e, E>(
        ex: E,
        account_id: &str,
        tx_type: TxType,
        amount_minor: i64,
        at: DateTime<Utc>,
    ) -> PersistenceResult<TransactionLogEntry>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "INSERT INTO transaction_log (account_id, tx_type, amount_minor, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(account_id)
        .bind(tx_type.as_str())
        .bind(amount_minor)
        .bind(at)
        .execute(ex)
        .await?;

        Ok(TransactionLogEntry {
            id: result.last_insert_rowid(),
            account_id: account_id.to_string(),
            tx_type,
            amount: minor_to_decimal(amount_minor),
            created_at: at,
        })
    }

    /// An account's entries in commit order (id ascending)
    pub async fn list_by_account<'e, E>(
        ex: E,
        account_id: &str,
    ) -> PersistenceResult<Vec<TransactionLogRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, TransactionLogRow>(
            "SELECT * FROM transaction_log WHERE account_id = ? ORDER BY id",
        )
        .bind(account_id)
        .fetch_all(ex)
        .await?;
        Ok(rows)
    }

    /// Count entries for an account
    pub async fn count_by_account<'e, E>(ex: E, account_id: &str) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM transaction_log WHERE account_id = ?")
                .bind(account_id)
                .fetch_one(ex)
                .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Closure Record Repository
// ============================================================================

/// Repository for the closure_records table (append-only, one per account)
pub struct ClosureRepo;

impl ClosureRepo {
    /// Insert the closure record for an account. The table's UNIQUE
    /// constraint on account_id backs the exactly-once guarantee; a second
    /// insert surfaces as `AlreadyExists`.
    pub async fn insert<'e, E>(
        ex: E,
        account_id: &str,
        reason: &str,
        at: DateTime<Utc>,
    ) -> PersistenceResult<ClosureRecord>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "INSERT INTO closure_records (account_id, reason, created_at) VALUES (?, ?, ?)",
        )
        .bind(account_id)
        .bind(reason)
        .bind(at)
        .execute(ex)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                PersistenceError::already_exists("ClosureRecord", account_id)
            } else {
                PersistenceError::from(e)
            }
        })?;

        Ok(ClosureRecord {
            id: result.last_insert_rowid(),
            account_id: account_id.to_string(),
            reason: reason.to_string(),
            created_at: at,
        })
    }

    /// The closure record for an account, if it has one
    pub async fn find_by_account<'e, E>(
        ex: E,
        account_id: &str,
    ) -> PersistenceResult<Option<ClosureRecordRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let row = sqlx::query_as::<_, ClosureRecordRow>(
            "SELECT * FROM closure_records WHERE account_id = ?",
        )
        .bind(account_id)
        .fetch_optional(ex)
        .await?;
        Ok(row)
    }

    /// Count closure records for an account
    pub async fn count_by_account<'e, E>(ex: E, account_id: &str) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM closure_records WHERE account_id = ?")
                .bind(account_id)
                .fetch_one(ex)
                .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Loan Repository
// ============================================================================

/// Repository for the loans table
pub struct LoanRepo;

impl LoanRepo {
    /// Insert a new loan
    pub async fn insert<'e, E>(ex: E, loan: &Loan) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let row = LoanRow::try_from(loan)?;
        sqlx::query(
            r#"
            INSERT INTO loans (id, customer_id, principal_minor, total_payable_minor, rate, duration_months, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.customer_id)
        .bind(row.principal_minor)
        .bind(row.total_payable_minor)
        .bind(&row.rate)
        .bind(row.duration_months)
        .bind(row.created_at)
        .execute(ex)
        .await?;
        Ok(())
    }

    /// Fetch a loan by ID
    pub async fn find_by_id<'e, E>(ex: E, id: &str) -> PersistenceResult<Option<LoanRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let row = sqlx::query_as::<_, LoanRow>("SELECT * FROM loans WHERE id = ?")
            .bind(id)
            .fetch_optional(ex)
            .await?;
        Ok(row)
    }

    /// A customer's loans
    pub async fn list_by_customer<'e, E>(
        ex: E,
        customer_id: &str,
    ) -> PersistenceResult<Vec<LoanRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, LoanRow>(
            "SELECT * FROM loans WHERE customer_id = ? ORDER BY created_at, id",
        )
        .bind(customer_id)
        .fetch_all(ex)
        .await?;
        Ok(rows)
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Initialize the database connection pool.
///
/// `busy_timeout` makes concurrent writers queue instead of failing
/// immediately; whatever still surfaces as SQLITE_BUSY is reported to the
/// caller as a retryable conflict.
pub async fn create_pool(database_url: &str) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(sqlx::Error::from)?
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(pool)
}

/// Create the ledger schema
pub async fn create_schema(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::query(
        r#"
        -- Customer directory backing table
        CREATE TABLE IF NOT EXISTS customers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            overdraft_limit_minor INTEGER NOT NULL DEFAULT 0 CHECK (overdraft_limit_minor >= 0),
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        -- Accounts: balance in cents, closed is terminal
        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            balance_minor INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'dormant', 'closed')),
            reason_for_closure TEXT CHECK (length(reason_for_closure) <= 50),
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (customer_id) REFERENCES customers(id)
        );

        -- Append-only transaction log; rowid order is commit order
        CREATE TABLE IF NOT EXISTS transaction_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id TEXT NOT NULL,
            tx_type TEXT NOT NULL CHECK (tx_type IN ('deposit', 'withdrawal')),
            amount_minor INTEGER NOT NULL CHECK (amount_minor > 0),
            created_at DATETIME NOT NULL,
            FOREIGN KEY (account_id) REFERENCES accounts(id)
        );

        -- One closure record per account, ever
        CREATE TABLE IF NOT EXISTS closure_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id TEXT NOT NULL UNIQUE,
            reason TEXT NOT NULL,
            created_at DATETIME NOT NULL,
            FOREIGN KEY (account_id) REFERENCES accounts(id)
        );

        -- Loans written once at account opening
        CREATE TABLE IF NOT EXISTS loans (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            principal_minor INTEGER NOT NULL CHECK (principal_minor >= 0),
            total_payable_minor INTEGER NOT NULL,
            rate TEXT NOT NULL,
            duration_months INTEGER NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (customer_id) REFERENCES customers(id)
        );

        CREATE INDEX IF NOT EXISTS idx_accounts_customer ON accounts(customer_id);
        CREATE INDEX IF NOT EXISTS idx_txlog_account ON transaction_log(account_id);
        CREATE INDEX IF NOT EXISTS idx_loans_customer ON loans(customer_id);
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Create the database file if missing and bootstrap the schema
pub async fn init_database(database_url: &str) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(sqlx::Error::from)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    create_schema(&pool).await?;

    Ok(pool)
}
