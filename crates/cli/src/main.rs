//! Minibank CLI - Teller operations from command line
//!
//! Usage:
//! ```bash
//! minibank init
//! minibank customer add --name "Alice" --overdraft-limit 200
//! minibank open CUST_... 500 --principal 1000 --rate 5 --duration-months 24
//! minibank deposit ACC_... 100
//! minibank withdraw ACC_... 30
//! minibank close ACC_... "Customer Request"
//! minibank history ACC_... --json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

mod commands;
mod db;

use commands::{account, customer, ledger};

/// Minibank - a retail-banking ledger over SQLite
#[derive(Parser)]
#[command(name = "minibank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file path
    #[arg(long, default_value = "data/minibank.db", global = true)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize database with the ledger schema
    Init {
        /// Force re-initialization (drops existing data)
        #[arg(long)]
        force: bool,
    },

    /// Show database status
    Status,

    /// Customer directory management
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },

    /// Open an account (with its loan) for an existing customer
    Open {
        /// Customer ID
        customer_id: String,
        /// Opening balance
        opening_balance: Decimal,
        /// Loan principal
        #[arg(long, default_value = "0")]
        principal: Decimal,
        /// Interest rate in percent (5 means 5%)
        #[arg(long, default_value = "0")]
        rate: Decimal,
        /// Loan duration in months
        #[arg(long, default_value = "0")]
        duration_months: i64,
    },

    /// Deposit funds into an account
    Deposit {
        /// Account ID
        account_id: String,
        /// Amount to deposit
        amount: Decimal,
    },

    /// Withdraw funds from an account
    Withdraw {
        /// Account ID
        account_id: String,
        /// Amount to withdraw
        amount: Decimal,
    },

    /// Close an account, recording the reason
    Close {
        /// Account ID
        account_id: String,
        /// Reason for closure (max 50 characters)
        reason: String,
    },

    /// Show an account's transaction log
    History {
        /// Account ID
        account_id: String,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show account details (including any closure record)
    Show {
        /// Account ID
        account_id: String,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CustomerAction {
    /// Register a new customer
    Add {
        /// Customer name
        #[arg(long, short)]
        name: String,
        /// Overdraft limit (how far below zero accounts may go)
        #[arg(long, default_value = "0")]
        overdraft_limit: Decimal,
    },
    /// List all customers
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Ensure the data directory exists
    if let Some(parent) = cli.db.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    match cli.command {
        Commands::Init { force } => {
            db::init_database(&cli.db, force).await?;
            println!("Database initialized at {:?}", cli.db);
        }

        Commands::Status => {
            db::show_status(&cli.db).await?;
        }

        Commands::Customer { action } => {
            customer::handle(&cli.db, action).await?;
        }

        Commands::Open {
            customer_id,
            opening_balance,
            principal,
            rate,
            duration_months,
        } => {
            account::open(
                &cli.db,
                &customer_id,
                opening_balance,
                principal,
                rate,
                duration_months,
            )
            .await?;
        }

        Commands::Deposit { account_id, amount } => {
            ledger::deposit(&cli.db, &account_id, amount).await?;
        }

        Commands::Withdraw { account_id, amount } => {
            ledger::withdraw(&cli.db, &account_id, amount).await?;
        }

        Commands::Close { account_id, reason } => {
            account::close(&cli.db, &account_id, &reason).await?;
        }

        Commands::History { account_id, json } => {
            ledger::history(&cli.db, &account_id, json).await?;
        }

        Commands::Show { account_id, json } => {
            account::show(&cli.db, &account_id, json).await?;
        }
    }

    Ok(())
}
