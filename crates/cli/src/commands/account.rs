//! Account commands: open, close, show

use anyhow::Result;
use minibank_engine::LoanTerms;
use rust_decimal::Decimal;
use std::path::Path;

use crate::commands::engine_for;
use crate::db;

/// Open an account with its loan
pub async fn open(
    db_path: &Path,
    customer_id: &str,
    opening_balance: Decimal,
    principal: Decimal,
    rate: Decimal,
    duration_months: i64,
) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let engine = engine_for(&pool);

    let opened = engine
        .open_account(
            customer_id,
            opening_balance,
            LoanTerms {
                principal,
                rate,
                duration_months,
            },
        )
        .await?;

    println!("Account opened");
    println!("   Account:       {}", opened.account.id);
    println!("   Customer:      {}", opened.account.customer_id);
    println!("   Balance:       {}", opened.account.balance);
    println!("   Loan:          {}", opened.loan.id);
    println!("   Total payable: {}", opened.loan.total_payable);

    pool.close().await;
    Ok(())
}

/// Close an account
pub async fn close(db_path: &Path, account_id: &str, reason: &str) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let engine = engine_for(&pool);

    let record = engine.close_account(account_id, reason).await?;

    println!("Account closed");
    println!("   Account:  {}", record.account_id);
    println!("   Reason:   {}", record.reason);
    println!("   Recorded: {}", record.created_at);

    pool.close().await;
    Ok(())
}

/// Show account details and any closure record
pub async fn show(db_path: &Path, account_id: &str, json: bool) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let engine = engine_for(&pool);

    let account = engine.account(account_id).await?;
    let closure = engine.closure_record(account_id).await?;

    if json {
        let value = serde_json::json!({
            "account": account,
            "closure": closure,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", account);
        if let Some(record) = closure {
            println!("   {}", record);
        }
    }

    pool.close().await;
    Ok(())
}
