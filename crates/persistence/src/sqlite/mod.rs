//! SQLite persistence module
//!
//! Repository pattern for SQLite database access.

pub mod repos;
pub mod schema;

pub use repos::{
    create_pool, create_schema, init_database, AccountRepo, ClosureRepo, CustomerRepo, LoanRepo,
    TransactionLogRepo,
};
pub use schema::{
    decimal_to_minor, minor_to_decimal, AccountRow, ClosureRecordRow, CustomerRow, LoanRow,
    TransactionLogRow,
};
