//! Ledger applications
//!
//! An application records that part of a ledger entry paid down an
//! invoice. Applications are append-only: once written they are never
//! edited or deleted, so the history of how credit was spent stays intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ApplicationId, InvoiceId, LedgerEntryId, Money, UserId};

/// An immutable record that a ledger entry paid down an invoice
///
/// The sum of `amount` over an entry's applications always equals that
/// entry's `applied_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerApplication {
    /// Unique identifier
    pub id: ApplicationId,
    /// The entry whose value was consumed
    pub entry_id: LedgerEntryId,
    /// The invoice that was paid down
    pub invoice_id: InvoiceId,
    /// Invoice number, copied for display
    pub invoice_number: String,
    /// Amount applied (always positive)
    pub amount: Money,
    /// When the application was recorded
    pub applied_at: DateTime<Utc>,
    /// Acting user that recorded it
    pub applied_by: UserId,
}

impl LedgerApplication {
    /// Creates a new application record
    pub fn new(
        entry_id: LedgerEntryId,
        invoice_id: InvoiceId,
        invoice_number: impl Into<String>,
        amount: Money,
        applied_by: UserId,
    ) -> Self {
        Self {
            id: ApplicationId::new_v7(),
            entry_id,
            invoice_id,
            invoice_number: invoice_number.into(),
            amount,
            applied_at: Utc::now(),
            applied_by,
        }
    }
}
