//! # Minibank Engine
//!
//! The account ledger invariant engine: guarantees that an account's
//! balance, its transaction log, and its closure record stay consistent
//! under concurrent deposits, withdrawals, and closures.
//!
//! Every public operation runs as one atomic SQLite transaction - the
//! balance guard, the balance write, and the log or closure insert either
//! all commit or all roll back. The engine itself holds no state between
//! calls; arbitrarily many callers may share one instance.

pub mod directory;
pub mod engine;
pub mod error;
pub mod watcher;

pub use directory::{CustomerDirectory, SqliteCustomerDirectory};
pub use engine::{LoanTerms, OpenedAccount, TransactionEngine};
pub use error::{EngineError, EngineResult};
pub use watcher::{ClosureWatcher, StatusChange};
