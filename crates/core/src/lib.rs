//! # Minibank Core
//!
//! Pure domain types for the account ledger: accounts, transaction log
//! entries, closure records, loans, and customers. No I/O lives here;
//! persistence and the transaction engine build on top of these types.

pub mod account;
pub mod customer;
pub mod error;
pub mod ledger;
pub mod loan;

pub use account::{Account, AccountStatus};
pub use customer::Customer;
pub use error::{CoreError, CoreResult};
pub use ledger::{ClosureRecord, TransactionLogEntry, TxType};
pub use loan::{total_payable, Loan};
