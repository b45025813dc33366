//! # Loan Module
//!
//! Loan record written once at account opening, plus the flat-interest
//! calculator that fills its `total_payable` field.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat-interest total: principal × (1 + rate/100).
///
/// `rate` is a percentage (5 means 5%). Exact decimal arithmetic throughout;
/// rounds half-up to 2 decimal places at the final result only.
pub fn total_payable(principal: Decimal, rate: Decimal) -> Decimal {
    let factor = Decimal::ONE + rate / Decimal::ONE_HUNDRED;
    (principal * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A loan taken out alongside an account opening. Never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub customer_id: String,
    /// Amount lent, 2 decimal places
    pub principal: Decimal,
    /// Principal plus flat interest, 2 decimal places
    pub total_payable: Decimal,
    /// Interest rate as a percentage (2 dp)
    pub rate: Decimal,
    pub duration_months: i64,
}

impl Loan {
    /// Build a loan with `total_payable` computed from principal and rate.
    pub fn new(
        id: String,
        customer_id: String,
        principal: Decimal,
        rate: Decimal,
        duration_months: i64,
    ) -> Self {
        Self {
            id,
            customer_id,
            total_payable: total_payable(principal, rate),
            principal,
            rate,
            duration_months,
        }
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loan {} ({} at {}% over {} months, total {})",
            self.id, self.principal, self.rate, self.duration_months, self.total_payable
        )
    }
}
