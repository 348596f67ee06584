//! Ledger domain errors

use core_kernel::{CoreError, LedgerEntryId, MoneyError, StudentId};
use thiserror::Error;

/// Errors that can occur in the student ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Bad input shape (non-positive amount, empty reason)
    #[error("{0}")]
    Validation(String),

    /// Ledger entry not found
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(LedgerEntryId),

    /// Student not found
    #[error("Student not found: {0}")]
    StudentNotFound(StudentId),

    /// Business-rule violation with a human-readable reason
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// No acting user was resolved for a mutating call
    #[error("Unauthorized: no acting user")]
    Unauthorized,

    /// Money arithmetic error
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized => LedgerError::Unauthorized,
            CoreError::Validation(message) => LedgerError::Validation(message),
            CoreError::InvalidOperation(message) => LedgerError::InvalidOperation(message),
            CoreError::NotFound(message) => LedgerError::InvalidOperation(message),
            CoreError::Money(err) => LedgerError::Money(err),
            CoreError::Temporal(err) => LedgerError::Validation(err.to_string()),
        }
    }
}
