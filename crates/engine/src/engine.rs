//! Transaction engine - open, deposit, withdraw, close
//!
//! Each operation validates its inputs, then executes as one SQLite
//! transaction. Balance checks and balance writes happen in a single
//! guarded UPDATE, so two concurrent withdrawals can never both pass the
//! funds check against a stale balance: the loser either sees the committed
//! balance (and fails `InsufficientFunds`) or surfaces a retryable
//! `ConcurrencyConflict`.

use crate::directory::CustomerDirectory;
use crate::error::{EngineError, EngineResult};
use crate::watcher::{ClosureWatcher, StatusChange};
use chrono::Utc;
use minibank_core::{
    Account, AccountStatus, ClosureRecord, Loan, TransactionLogEntry, TxType,
};
use minibank_persistence::{
    decimal_to_minor, minor_to_decimal, AccountRepo, AccountRow, ClosureRepo, LoanRepo,
    PersistenceError, TransactionLogRepo, TransactionLogRow,
};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Maximum length of a closure reason (schema: varchar 50)
const MAX_REASON_LEN: usize = 50;

/// Loan terms supplied at account opening.
#[derive(Debug, Clone, Copy)]
pub struct LoanTerms {
    pub principal: Decimal,
    /// Interest rate as a percentage (5 means 5%)
    pub rate: Decimal,
    pub duration_months: i64,
}

/// Result of a successful account opening: the account and its loan,
/// committed atomically - neither exists without the other.
#[derive(Debug, Clone)]
pub struct OpenedAccount {
    pub account: Account,
    pub loan: Loan,
}

/// The transaction engine. Stateless between calls; clone freely.
#[derive(Clone)]
pub struct TransactionEngine {
    pool: SqlitePool,
    directory: Arc<dyn CustomerDirectory>,
    watcher: ClosureWatcher,
}

impl TransactionEngine {
    pub fn new(pool: SqlitePool, directory: Arc<dyn CustomerDirectory>) -> Self {
        Self {
            pool,
            directory,
            watcher: ClosureWatcher,
        }
    }

    /// Open an account for an existing customer, recording its loan in the
    /// same transaction.
    pub async fn open_account(
        &self,
        customer_id: &str,
        opening_balance: Decimal,
        terms: LoanTerms,
    ) -> EngineResult<OpenedAccount> {
        if opening_balance < Decimal::ZERO {
            return Err(EngineError::InvalidAmount(opening_balance));
        }
        if terms.principal < Decimal::ZERO {
            return Err(EngineError::InvalidAmount(terms.principal));
        }
        if terms.rate < Decimal::ZERO {
            return Err(EngineError::InvalidAmount(terms.rate));
        }
        // Sub-cent amounts never round silently
        valid_minor(opening_balance)?;
        valid_minor(terms.principal)?;

        if !self.directory.customer_exists(customer_id).await? {
            return Err(EngineError::UnknownCustomer(customer_id.to_string()));
        }

        let account = Account::open(
            Uuid::new_v4().to_string(),
            customer_id.to_string(),
            opening_balance,
        )?;
        let loan = Loan::new(
            Uuid::new_v4().to_string(),
            customer_id.to_string(),
            terms.principal,
            terms.rate,
            terms.duration_months,
        );

        let mut tx = self.pool.begin().await?;
        AccountRepo::insert(&mut *tx, &account).await?;
        LoanRepo::insert(&mut *tx, &loan).await?;
        tx.commit().await?;

        tracing::info!(
            account_id = %account.id,
            customer_id,
            %opening_balance,
            "account opened"
        );
        Ok(OpenedAccount { account, loan })
    }

    /// Deposit a positive amount, appending one log entry atomically with
    /// the balance increment.
    pub async fn deposit(
        &self,
        account_id: &str,
        amount: Decimal,
    ) -> EngineResult<TransactionLogEntry> {
        let amount_minor = positive_minor(amount)?;

        let mut tx = self.pool.begin().await?;
        let changed = AccountRepo::apply_delta(&mut *tx, account_id, amount_minor, None).await?;
        if changed == 0 {
            // Rolls back on drop
            let row = AccountRepo::find_by_id(&mut *tx, account_id).await?;
            return Err(reject_unmodified(account_id, row, None));
        }
        let entry =
            TransactionLogRepo::append(&mut *tx, account_id, TxType::Deposit, amount_minor, Utc::now())
                .await?;
        tx.commit().await?;

        tracing::info!(account_id, %amount, entry_id = entry.id, "deposit committed");
        Ok(entry)
    }

    /// Withdraw a positive amount. The funds check
    /// (balance + overdraft ≥ amount) and the decrement are one guarded
    /// UPDATE inside the transaction - a rejected withdrawal touches
    /// nothing.
    pub async fn withdraw(
        &self,
        account_id: &str,
        amount: Decimal,
    ) -> EngineResult<TransactionLogEntry> {
        let amount_minor = positive_minor(amount)?;

        // customer_id is immutable, so this pre-transaction read is safe
        let row = AccountRepo::find_by_id(&self.pool, account_id)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(account_id.to_string()))?;
        let overdraft_limit = self.directory.overdraft_limit(&row.customer_id).await?;
        let floor_minor = -decimal_to_minor(overdraft_limit)?;

        let mut tx = self.pool.begin().await?;
        let changed =
            AccountRepo::apply_delta(&mut *tx, account_id, -amount_minor, Some(floor_minor))
                .await?;
        if changed == 0 {
            let row = AccountRepo::find_by_id(&mut *tx, account_id).await?;
            return Err(reject_unmodified(
                account_id,
                row,
                Some((amount, overdraft_limit)),
            ));
        }
        let entry = TransactionLogRepo::append(
            &mut *tx,
            account_id,
            TxType::Withdrawal,
            amount_minor,
            Utc::now(),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(account_id, %amount, entry_id = entry.id, "withdrawal committed");
        Ok(entry)
    }

    /// Close an account, recording the reason. The status flip and the
    /// closure record commit together; repeat closes are rejected with
    /// `AlreadyClosed`.
    pub async fn close_account(
        &self,
        account_id: &str,
        reason: &str,
    ) -> EngineResult<ClosureRecord> {
        // Character count, matching the schema's length() CHECK
        let reason_chars = reason.chars().count();
        if reason_chars == 0 || reason_chars > MAX_REASON_LEN {
            return Err(EngineError::InvalidReason(format!(
                "reason must be 1-{MAX_REASON_LEN} characters, got {reason_chars}"
            )));
        }

        let mut tx = self.pool.begin().await?;
        let row = AccountRepo::find_by_id(&mut *tx, account_id)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(account_id.to_string()))?;
        let old_status = Account::try_from(row)?.status;
        if old_status == AccountStatus::Closed {
            return Err(EngineError::AlreadyClosed(account_id.to_string()));
        }

        let changed = AccountRepo::mark_closed(&mut *tx, account_id, reason).await?;
        if changed == 0 {
            // Lost a race with a concurrent close between read and write
            return Err(EngineError::AlreadyClosed(account_id.to_string()));
        }

        let Some(record) = self
            .watcher
            .observe(
                &mut tx,
                StatusChange {
                    account_id,
                    old_status,
                    new_status: AccountStatus::Closed,
                    reason,
                },
                Utc::now(),
            )
            .await?
        else {
            // Unreachable given the old_status check above
            return Err(EngineError::Persistence(PersistenceError::Configuration(
                format!("closure watcher did not fire for {account_id}"),
            )));
        };
        tx.commit().await?;

        tracing::info!(account_id, reason, record_id = record.id, "account closed");
        Ok(record)
    }

    // === Read paths for the caller/teller layer ===

    /// Current account state.
    pub async fn account(&self, account_id: &str) -> EngineResult<Account> {
        let row = AccountRepo::find_by_id(&self.pool, account_id)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(account_id.to_string()))?;
        Ok(Account::try_from(row)?)
    }

    /// An account's transaction log in commit order.
    pub async fn history(&self, account_id: &str) -> EngineResult<Vec<TransactionLogEntry>> {
        if AccountRepo::find_by_id(&self.pool, account_id).await?.is_none() {
            return Err(EngineError::AccountNotFound(account_id.to_string()));
        }
        let rows = TransactionLogRepo::list_by_account(&self.pool, account_id).await?;
        rows.into_iter()
            .map(|row: TransactionLogRow| Ok(TransactionLogEntry::try_from(row)?))
            .collect()
    }

    /// The closure record, if the account has been closed.
    pub async fn closure_record(&self, account_id: &str) -> EngineResult<Option<ClosureRecord>> {
        let row = ClosureRepo::find_by_account(&self.pool, account_id).await?;
        Ok(row.map(ClosureRecord::from))
    }
}

/// Amount must be strictly positive and at most 2 dp; returns cents.
fn positive_minor(amount: Decimal) -> EngineResult<i64> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::InvalidAmount(amount));
    }
    valid_minor(amount)
}

/// Amount must be representable in cents; returns cents.
fn valid_minor(amount: Decimal) -> EngineResult<i64> {
    decimal_to_minor(amount).map_err(|_| EngineError::InvalidAmount(amount))
}

/// Turn a zero-rows-affected guarded update into the right rejection.
///
/// `funds` carries (requested, overdraft_limit) for withdrawals; deposits
/// pass `None` since their only guards are existence and status.
fn reject_unmodified(
    account_id: &str,
    row: Option<AccountRow>,
    funds: Option<(Decimal, Decimal)>,
) -> EngineError {
    let Some(row) = row else {
        return EngineError::AccountNotFound(account_id.to_string());
    };
    if row.status == AccountStatus::Closed.as_str() {
        return EngineError::AccountClosed(account_id.to_string());
    }
    match funds {
        Some((requested, overdraft_limit)) => EngineError::InsufficientFunds {
            requested,
            available: minor_to_decimal(row.balance_minor),
            overdraft_limit,
        },
        // Deposit guard only fails for missing or closed accounts; a live
        // row here means the account closed between our two statements
        None => EngineError::AccountClosed(account_id.to_string()),
    }
}
