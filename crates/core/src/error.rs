//! # Error Module
//!
//! Domain errors for Minibank core, using thiserror.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors.
///
/// Pure validation failures; infrastructure errors live in the persistence
/// and engine layers.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Account already closed: {0}")]
    AlreadyClosed(String),
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidAmount(dec!(-5));
        assert_eq!(err.to_string(), "Invalid amount: -5");

        let err = CoreError::AlreadyClosed("ACC_001".to_string());
        assert_eq!(err.to_string(), "Account already closed: ACC_001");
    }
}
