//! Integration tests for the transaction engine
//!
//! These tests run the four operations against a real SQLite database in a
//! temp directory and check the ledger invariants: exact balances, one log
//! entry per committed transaction, exactly-once closure records, and no
//! double-spend under concurrent withdrawals.

use minibank_core::{AccountStatus, Customer, TxType};
use minibank_engine::{
    EngineError, LoanTerms, SqliteCustomerDirectory, TransactionEngine,
};
use minibank_persistence::{
    init_database, AccountRepo, ClosureRepo, CustomerRepo, LoanRepo, TransactionLogRepo,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

const CUSTOMER: &str = "CUST_001";

fn terms() -> LoanTerms {
    LoanTerms {
        principal: dec!(1000.00),
        rate: dec!(5.00),
        duration_months: 24,
    }
}

/// Fresh database in a temp dir with one seeded customer.
async fn setup(overdraft_limit: Decimal) -> (TempDir, SqlitePool, TransactionEngine) {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("ledger.db").display());
    let pool = init_database(&url).await.unwrap();

    CustomerRepo::insert(&pool, &Customer::new(CUSTOMER, "Alice", overdraft_limit))
        .await
        .unwrap();

    let directory = Arc::new(SqliteCustomerDirectory::new(pool.clone()));
    let engine = TransactionEngine::new(pool.clone(), directory);
    (dir, pool, engine)
}

#[tokio::test]
async fn test_open_account_creates_account_and_loan() {
    let (_dir, pool, engine) = setup(dec!(0)).await;

    let opened = engine
        .open_account(CUSTOMER, dec!(500.00), terms())
        .await
        .unwrap();

    assert_eq!(opened.account.customer_id, CUSTOMER);
    assert_eq!(opened.account.balance, dec!(500.00));
    assert_eq!(opened.account.status, AccountStatus::Active);
    assert_eq!(opened.loan.total_payable, dec!(1050.00));

    let stored = engine.account(&opened.account.id).await.unwrap();
    assert_eq!(stored.balance, dec!(500.00));
    assert!(LoanRepo::find_by_id(&pool, &opened.loan.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_open_account_unknown_customer_creates_nothing() {
    let (_dir, pool, engine) = setup(dec!(0)).await;

    let err = engine
        .open_account("CUST_404", dec!(500.00), terms())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownCustomer(_)));

    // Neither the account nor the loan may exist
    assert!(AccountRepo::list_all(&pool).await.unwrap().is_empty());
    assert!(LoanRepo::list_by_customer(&pool, "CUST_404")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_open_account_rejects_negative_opening_balance() {
    let (_dir, pool, engine) = setup(dec!(0)).await;

    let err = engine
        .open_account(CUSTOMER, dec!(-1.00), terms())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(AccountRepo::list_all(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deposit_updates_balance_and_logs_once() {
    let (_dir, pool, engine) = setup(dec!(0)).await;
    let account = engine
        .open_account(CUSTOMER, dec!(100.00), terms())
        .await
        .unwrap()
        .account;

    let entry = engine.deposit(&account.id, dec!(50.25)).await.unwrap();
    assert_eq!(entry.account_id, account.id);
    assert_eq!(entry.tx_type, TxType::Deposit);
    assert_eq!(entry.amount, dec!(50.25));

    assert_eq!(
        engine.account(&account.id).await.unwrap().balance,
        dec!(150.25)
    );
    assert_eq!(
        TransactionLogRepo::count_by_account(&pool, &account.id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_deposit_rejects_bad_amounts() {
    let (_dir, pool, engine) = setup(dec!(0)).await;
    let account = engine
        .open_account(CUSTOMER, dec!(100.00), terms())
        .await
        .unwrap()
        .account;

    for amount in [dec!(0), dec!(-10), dec!(1.005)] {
        let err = engine.deposit(&account.id, amount).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)), "{amount}");
    }

    // Nothing changed
    assert_eq!(
        engine.account(&account.id).await.unwrap().balance,
        dec!(100.00)
    );
    assert_eq!(
        TransactionLogRepo::count_by_account(&pool, &account.id)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_deposit_unknown_account() {
    let (_dir, _pool, engine) = setup(dec!(0)).await;
    let err = engine.deposit("ACC_404", dec!(10.00)).await.unwrap_err();
    assert!(matches!(err, EngineError::AccountNotFound(_)));
}

#[tokio::test]
async fn test_balance_equals_opening_plus_net_flow() {
    let (_dir, _pool, engine) = setup(dec!(0)).await;
    let account = engine
        .open_account(CUSTOMER, dec!(100.00), terms())
        .await
        .unwrap()
        .account;

    engine.deposit(&account.id, dec!(50.25)).await.unwrap();
    engine.deposit(&account.id, dec!(0.01)).await.unwrap();
    engine.withdraw(&account.id, dec!(30.10)).await.unwrap();
    engine.withdraw(&account.id, dec!(0.01)).await.unwrap();

    // 100.00 + 50.25 + 0.01 - 30.10 - 0.01, decimal-exact
    assert_eq!(
        engine.account(&account.id).await.unwrap().balance,
        dec!(120.15)
    );

    let history = engine.history(&account.id).await.unwrap();
    assert_eq!(history.len(), 4);
    // Commit order: ids strictly increasing, timestamps non-decreasing
    for pair in history.windows(2) {
        assert!(pair[0].id < pair[1].id);
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[tokio::test]
async fn test_withdraw_insufficient_funds_leaves_no_trace() {
    let (_dir, pool, engine) = setup(dec!(0)).await;
    let account = engine
        .open_account(CUSTOMER, dec!(50.00), terms())
        .await
        .unwrap()
        .account;

    let err = engine.withdraw(&account.id, dec!(50.01)).await.unwrap_err();
    match err {
        EngineError::InsufficientFunds {
            requested,
            available,
            overdraft_limit,
        } => {
            assert_eq!(requested, dec!(50.01));
            assert_eq!(available, dec!(50.00));
            assert_eq!(overdraft_limit, dec!(0));
        }
        other => panic!("expected InsufficientFunds, got {other}"),
    }

    assert_eq!(
        engine.account(&account.id).await.unwrap().balance,
        dec!(50.00)
    );
    assert_eq!(
        TransactionLogRepo::count_by_account(&pool, &account.id)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_withdraw_into_overdraft_up_to_limit() {
    let (_dir, _pool, engine) = setup(dec!(200.00)).await;
    let account = engine
        .open_account(CUSTOMER, dec!(50.00), terms())
        .await
        .unwrap()
        .account;

    // 50 - 250 = -200, exactly at the overdraft floor
    engine.withdraw(&account.id, dec!(250.00)).await.unwrap();
    assert_eq!(
        engine.account(&account.id).await.unwrap().balance,
        dec!(-200.00)
    );

    // One cent past the limit is rejected
    let err = engine.withdraw(&account.id, dec!(0.01)).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds { .. }));
}

#[tokio::test]
async fn test_close_account_exactly_once() {
    let (_dir, pool, engine) = setup(dec!(0)).await;
    let account = engine
        .open_account(CUSTOMER, dec!(0), terms())
        .await
        .unwrap()
        .account;

    let record = engine
        .close_account(&account.id, "Customer Request")
        .await
        .unwrap();
    assert_eq!(record.account_id, account.id);
    assert_eq!(record.reason, "Customer Request");

    let closed = engine.account(&account.id).await.unwrap();
    assert_eq!(closed.status, AccountStatus::Closed);
    assert_eq!(
        closed.reason_for_closure.as_deref(),
        Some("Customer Request")
    );

    // Repeat close is rejected and writes no second record
    let err = engine
        .close_account(&account.id, "Again")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyClosed(_)));
    assert_eq!(
        ClosureRepo::count_by_account(&pool, &account.id)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        engine
            .closure_record(&account.id)
            .await
            .unwrap()
            .unwrap()
            .reason,
        "Customer Request"
    );
}

#[tokio::test]
async fn test_closed_account_rejects_transactions() {
    let (_dir, _pool, engine) = setup(dec!(0)).await;
    let account = engine
        .open_account(CUSTOMER, dec!(100.00), terms())
        .await
        .unwrap()
        .account;
    engine
        .close_account(&account.id, "Customer Request")
        .await
        .unwrap();

    let err = engine.deposit(&account.id, dec!(10.00)).await.unwrap_err();
    assert!(matches!(err, EngineError::AccountClosed(_)));

    let err = engine.withdraw(&account.id, dec!(10.00)).await.unwrap_err();
    assert!(matches!(err, EngineError::AccountClosed(_)));

    // Balance frozen at closing value
    assert_eq!(
        engine.account(&account.id).await.unwrap().balance,
        dec!(100.00)
    );
}

#[tokio::test]
async fn test_close_rejects_oversize_reason() {
    let (_dir, _pool, engine) = setup(dec!(0)).await;
    let account = engine
        .open_account(CUSTOMER, dec!(0), terms())
        .await
        .unwrap()
        .account;

    let err = engine
        .close_account(&account.id, &"x".repeat(51))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReason(_)));
    assert!(engine.account(&account.id).await.unwrap().is_open());
}

/// The 50-character reason limit counts characters, not UTF-8 bytes.
#[tokio::test]
async fn test_close_accepts_multibyte_reason_within_limit() {
    let (_dir, _pool, engine) = setup(dec!(0)).await;
    let account = engine
        .open_account(CUSTOMER, dec!(0), terms())
        .await
        .unwrap()
        .account;

    // 25 characters but 75 bytes
    let reason = "ệ".repeat(25);
    let record = engine.close_account(&account.id, &reason).await.unwrap();
    assert_eq!(record.reason, reason);

    let closed = engine.account(&account.id).await.unwrap();
    assert_eq!(closed.status, AccountStatus::Closed);
    assert_eq!(closed.reason_for_closure.as_deref(), Some(reason.as_str()));
}

/// Two racing withdrawals of 100 against balance 150: exactly one commits.
#[tokio::test]
async fn test_concurrent_withdrawals_never_double_spend() {
    let (_dir, pool, engine) = setup(dec!(0)).await;
    let account = engine
        .open_account(CUSTOMER, dec!(150.00), terms())
        .await
        .unwrap()
        .account;

    async fn withdraw_with_retry(
        engine: TransactionEngine,
        account_id: String,
    ) -> Result<(), EngineError> {
        loop {
            match engine.withdraw(&account_id, dec!(100.00)).await {
                Err(err) if err.is_retryable() => continue,
                Err(err) => return Err(err),
                Ok(_) => return Ok(()),
            }
        }
    }

    let a = tokio::spawn(withdraw_with_retry(engine.clone(), account.id.clone()));
    let b = tokio::spawn(withdraw_with_retry(engine.clone(), account.id.clone()));
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one withdrawal must commit: {a:?} {b:?}");
    for result in [a, b] {
        if let Err(err) = result {
            assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        }
    }

    // Ledger agrees: one entry, balance 50
    assert_eq!(
        engine.account(&account.id).await.unwrap().balance,
        dec!(50.00)
    );
    assert_eq!(
        TransactionLogRepo::count_by_account(&pool, &account.id)
            .await
            .unwrap(),
        1
    );
}
