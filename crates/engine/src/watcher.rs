//! Closure watcher
//!
//! Observes account status transitions and records closures. The watcher is
//! invoked synchronously from inside `close_account`'s transaction, so the
//! status flip and the closure record commit together or not at all - the
//! "exactly once, same commit" guarantee a database trigger would give.

use crate::error::EngineResult;
use chrono::{DateTime, Utc};
use minibank_core::{AccountStatus, ClosureRecord};
use minibank_persistence::ClosureRepo;
use sqlx::SqliteConnection;

/// A committed-in-progress status transition handed to the watcher.
#[derive(Debug, Clone, Copy)]
pub struct StatusChange<'a> {
    pub account_id: &'a str,
    pub old_status: AccountStatus,
    pub new_status: AccountStatus,
    pub reason: &'a str,
}

impl StatusChange<'_> {
    /// True only for a transition into Closed from a non-Closed status.
    fn is_closure(&self) -> bool {
        self.new_status == AccountStatus::Closed && self.old_status != AccountStatus::Closed
    }
}

/// Records one ClosureRecord per transition into Closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosureWatcher;

impl ClosureWatcher {
    /// Inspect a status change inside the caller's transaction.
    ///
    /// Inserts exactly one closure record iff the change is a transition
    /// into Closed; every other change (including reason edits on an
    /// already-closed account) is a no-op returning `None`.
    pub async fn observe(
        &self,
        conn: &mut SqliteConnection,
        change: StatusChange<'_>,
        at: DateTime<Utc>,
    ) -> EngineResult<Option<ClosureRecord>> {
        if !change.is_closure() {
            return Ok(None);
        }

        let record = ClosureRepo::insert(&mut *conn, change.account_id, change.reason, at).await?;
        tracing::debug!(
            account_id = change.account_id,
            record_id = record.id,
            "closure recorded"
        );
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_core::{Account, Customer};
    use minibank_persistence::{init_database, AccountRepo, ClosureRepo, CustomerRepo};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    // File-backed database: pooled connections to :memory: would each get
    // their own private store.
    async fn setup() -> (TempDir, sqlx::SqlitePool) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", dir.path().join("ledger.db").display());
        let pool = init_database(&url).await.unwrap();
        CustomerRepo::insert(&pool, &Customer::new("CUST_001", "Alice", dec!(0)))
            .await
            .unwrap();
        let account =
            Account::open("ACC_001".to_string(), "CUST_001".to_string(), dec!(0)).unwrap();
        AccountRepo::insert(&pool, &account).await.unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn test_fires_on_transition_into_closed() {
        let (_dir, pool) = setup().await;
        let watcher = ClosureWatcher;

        let mut tx = pool.begin().await.unwrap();
        let record = watcher
            .observe(
                &mut tx,
                StatusChange {
                    account_id: "ACC_001",
                    old_status: AccountStatus::Active,
                    new_status: AccountStatus::Closed,
                    reason: "Customer Request",
                },
                Utc::now(),
            )
            .await
            .unwrap()
            .expect("closure should be recorded");
        tx.commit().await.unwrap();

        assert_eq!(record.account_id, "ACC_001");
        assert_eq!(record.reason, "Customer Request");
        assert_eq!(
            ClosureRepo::count_by_account(&pool, "ACC_001").await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_no_op_when_status_stays_closed() {
        let (_dir, pool) = setup().await;
        let watcher = ClosureWatcher;

        let mut tx = pool.begin().await.unwrap();
        let record = watcher
            .observe(
                &mut tx,
                StatusChange {
                    account_id: "ACC_001",
                    old_status: AccountStatus::Closed,
                    new_status: AccountStatus::Closed,
                    reason: "Edited reason",
                },
                Utc::now(),
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(record.is_none());
        assert_eq!(
            ClosureRepo::count_by_account(&pool, "ACC_001").await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_no_op_on_dormancy_transition() {
        let (_dir, pool) = setup().await;
        let watcher = ClosureWatcher;

        let mut tx = pool.begin().await.unwrap();
        let record = watcher
            .observe(
                &mut tx,
                StatusChange {
                    account_id: "ACC_001",
                    old_status: AccountStatus::Active,
                    new_status: AccountStatus::Dormant,
                    reason: "",
                },
                Utc::now(),
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(record.is_none());
    }
}
