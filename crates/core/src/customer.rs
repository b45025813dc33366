//! # Customer Module
//!
//! The customer directory entry the engine sees: an identity plus an
//! overdraft limit. Everything else about a customer (addresses, logins,
//! branch assignment) belongs to the external directory, not this core.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A customer known to the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// How far below zero this customer's accounts may go (≥ 0)
    pub overdraft_limit: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(id: &str, name: &str, overdraft_limit: Decimal) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            overdraft_limit,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Customer {} ({}, overdraft limit: {})",
            self.id, self.name, self.overdraft_limit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_customer_new() {
        let customer = Customer::new("CUST_001", "Alice", dec!(200.00));
        assert_eq!(customer.id, "CUST_001");
        assert_eq!(customer.overdraft_limit, dec!(200.00));
    }
}
