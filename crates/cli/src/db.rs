//! Database initialization and status

use anyhow::{Context, Result};
use minibank_persistence::Database;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize the database with the ledger schema
pub async fn init_database(db_path: &Path, force: bool) -> Result<()> {
    if force && db_path.exists() {
        std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        println!("Removed existing database");
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let db = Database::init(&db_url)
        .await
        .context("Failed to initialize database")?;

    db.pool().close().await;
    Ok(())
}

/// Connect to an existing database pool
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {:?}. Run 'minibank init' first.",
            db_path
        );
    }
    let db_url = format!("sqlite:{}", db_path.display());
    let db = Database::new(&db_url)
        .await
        .context("Failed to connect to database")?;
    Ok(db.pool().clone())
}

/// Show database status
pub async fn show_status(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        println!("Database not found at {:?}", db_path);
        println!("Run 'minibank init' to create the database");
        return Ok(());
    }

    let pool = connect(db_path).await?;

    println!("Database Status");
    println!("   Path: {:?}", db_path);
    println!();

    let customer_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
        .fetch_one(&pool)
        .await
        .unwrap_or((0,));

    let account_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
        .fetch_one(&pool)
        .await
        .unwrap_or((0,));

    let tx_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transaction_log")
        .fetch_one(&pool)
        .await
        .unwrap_or((0,));

    let closure_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM closure_records")
        .fetch_one(&pool)
        .await
        .unwrap_or((0,));

    let loan_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM loans")
        .fetch_one(&pool)
        .await
        .unwrap_or((0,));

    println!("   Customers:       {}", customer_count.0);
    println!("   Accounts:        {}", account_count.0);
    println!("   Log entries:     {}", tx_count.0);
    println!("   Closures:        {}", closure_count.0);
    println!("   Loans:           {}", loan_count.0);

    pool.close().await;
    Ok(())
}
