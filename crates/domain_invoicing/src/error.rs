//! Invoicing domain errors

use core_kernel::{CoreError, InvoiceId, MoneyError};
use domain_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur in the invoicing domain
#[derive(Debug, Error)]
pub enum InvoicingError {
    /// Bad input shape (non-positive amount, empty line selection)
    #[error("{0}")]
    Validation(String),

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Business-rule violation with a human-readable reason
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// No acting user was resolved for a mutating call
    #[error("Unauthorized: no acting user")]
    Unauthorized,

    /// Money arithmetic error
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Failure propagated from the ledger domain
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<CoreError> for InvoicingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized => InvoicingError::Unauthorized,
            CoreError::Validation(message) => InvoicingError::Validation(message),
            CoreError::InvalidOperation(message) => InvoicingError::InvalidOperation(message),
            CoreError::NotFound(message) => InvoicingError::InvalidOperation(message),
            CoreError::Money(err) => InvoicingError::Money(err),
            CoreError::Temporal(err) => InvoicingError::Validation(err.to_string()),
        }
    }
}
