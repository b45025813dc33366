//! Customer directory commands

use anyhow::Result;
use minibank_core::Customer;
use minibank_persistence::CustomerRepo;
use rust_decimal::Decimal;
use std::path::Path;
use uuid::Uuid;

use crate::db;
use crate::CustomerAction;

/// Handle customer subcommands
pub async fn handle(db_path: &Path, action: CustomerAction) -> Result<()> {
    let pool = db::connect(db_path).await?;

    match action {
        CustomerAction::Add {
            name,
            overdraft_limit,
        } => {
            add_customer(&pool, &name, overdraft_limit).await?;
        }
        CustomerAction::List => {
            list_customers(&pool).await?;
        }
    }

    pool.close().await;
    Ok(())
}

async fn add_customer(
    pool: &sqlx::SqlitePool,
    name: &str,
    overdraft_limit: Decimal,
) -> Result<()> {
    if overdraft_limit < Decimal::ZERO {
        anyhow::bail!("Overdraft limit must not be negative: {overdraft_limit}");
    }

    let customer = Customer::new(&Uuid::new_v4().to_string(), name, overdraft_limit);
    CustomerRepo::insert(pool, &customer).await?;

    println!("Customer registered");
    println!("   ID:              {}", customer.id);
    println!("   Name:            {}", customer.name);
    println!("   Overdraft limit: {}", customer.overdraft_limit);
    Ok(())
}

async fn list_customers(pool: &sqlx::SqlitePool) -> Result<()> {
    let rows = CustomerRepo::list_all(pool).await?;
    if rows.is_empty() {
        println!("No customers registered");
        return Ok(());
    }

    println!("{} customer(s):", rows.len());
    for row in rows {
        let customer = Customer::from(row);
        println!("   {}", customer);
    }
    Ok(())
}
