//! Ledger commands: deposit, withdraw, history

use anyhow::Result;
use rust_decimal::Decimal;
use std::path::Path;

use crate::commands::engine_for;
use crate::db;

/// Deposit funds into an account
pub async fn deposit(db_path: &Path, account_id: &str, amount: Decimal) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let engine = engine_for(&pool);

    let entry = engine.deposit(account_id, amount).await?;
    let account = engine.account(account_id).await?;

    println!("Deposit successful");
    println!("   Entry:   {}", entry.id);
    println!("   Amount:  {}", entry.amount);
    println!("   Balance: {}", account.balance);

    pool.close().await;
    Ok(())
}

/// Withdraw funds from an account
pub async fn withdraw(db_path: &Path, account_id: &str, amount: Decimal) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let engine = engine_for(&pool);

    let entry = engine.withdraw(account_id, amount).await?;
    let account = engine.account(account_id).await?;

    println!("Withdrawal successful");
    println!("   Entry:   {}", entry.id);
    println!("   Amount:  {}", entry.amount);
    println!("   Balance: {}", account.balance);

    pool.close().await;
    Ok(())
}

/// Print an account's transaction log in commit order
pub async fn history(db_path: &Path, account_id: &str, json: bool) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let engine = engine_for(&pool);

    let entries = engine.history(account_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No transactions for {}", account_id);
    } else {
        println!("{} entries for {}:", entries.len(), account_id);
        for entry in &entries {
            println!(
                "   [{}] {:<10} {:>12}  {}",
                entry.id, entry.tx_type, entry.amount, entry.created_at
            );
        }
    }

    pool.close().await;
    Ok(())
}
