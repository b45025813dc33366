//! # Persistence Errors
//!
//! Error types for the persistence layer, wrapping sqlx errors.

use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    // === Database errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record already exists: {entity} with id {id}")]
    AlreadyExists { entity: String, id: String },

    // === Conversion errors ===
    #[error("Invalid decimal value: {0}")]
    InvalidDecimal(String),

    #[error("Invalid enum value: {field} = {value}")]
    InvalidEnumValue { field: String, value: String },

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    /// Create an AlreadyExists error
    pub fn already_exists(entity: &str, id: &str) -> Self {
        Self::AlreadyExists {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// SQLITE_BUSY / SQLITE_LOCKED family - the store could not serialize
    /// this transaction against a concurrent writer. The whole operation
    /// rolled back and can be retried.
    pub fn is_busy(&self) -> bool {
        let Self::Database(sqlx::Error::Database(db)) = self else {
            return false;
        };
        match db.code().as_deref().and_then(|c| c.parse::<i64>().ok()) {
            // Primary result codes live in the low byte of extended codes
            Some(code) => matches!(code & 0xFF, 5 | 6),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_display() {
        let err = PersistenceError::already_exists("ClosureRecord", "ACC_001");
        assert_eq!(
            err.to_string(),
            "Record already exists: ClosureRecord with id ACC_001"
        );
    }

    #[test]
    fn test_row_not_found_is_not_busy() {
        let err = PersistenceError::Database(sqlx::Error::RowNotFound);
        assert!(!err.is_busy());
    }
}
