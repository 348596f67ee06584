//! Credit allocation
//!
//! Matches a student's open credit entries against an invoice's
//! outstanding balance. All reads and writes for one invoice happen under
//! the owning student's lock: two concurrent calls can never both observe
//! the same remaining amount and both spend it.

use std::sync::Arc;

use tracing::info;

use core_kernel::{ActorContext, InvoiceId, LedgerEntryId, Money};
use domain_ledger::{LedgerApplication, LedgerStore, StudentLedgerEntry, StudentLocks};

use crate::error::InvoicingError;
use crate::invoice::Invoice;
use crate::store::InvoiceStore;

/// Result of a credit allocation run against one invoice
#[derive(Debug)]
pub struct AllocationOutcome {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    /// Total applied across all entries used in this run
    pub amount_applied: Money,
    /// Balance still due after the run
    pub remaining_balance: Money,
    /// Application records created, in the order they were applied
    pub applications: Vec<LedgerApplication>,
}

/// Applies open student credit to invoices
pub struct CreditAllocationEngine {
    invoices: Arc<InvoiceStore>,
    ledger: Arc<LedgerStore>,
    locks: Arc<StudentLocks>,
}

impl CreditAllocationEngine {
    pub fn new(
        invoices: Arc<InvoiceStore>,
        ledger: Arc<LedgerStore>,
        locks: Arc<StudentLocks>,
    ) -> Self {
        Self {
            invoices,
            ledger,
            locks,
        }
    }

    /// Applies the student's open credits to the invoice, oldest first
    ///
    /// Credits are consumed FIFO so the longest-standing credit is
    /// extinguished first. An invoice with no outstanding balance yields a
    /// zero-effect outcome, not an error, which makes repeated calls
    /// idempotent.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an acting user
    /// - `InvoiceNotFound` for an unknown invoice
    pub fn apply_credits_to_invoice(
        &self,
        ctx: &ActorContext,
        invoice_id: InvoiceId,
    ) -> Result<AllocationOutcome, InvoicingError> {
        let user = ctx.require_user()?;

        let invoice = self
            .invoices
            .get(invoice_id)
            .ok_or(InvoicingError::InvoiceNotFound(invoice_id))?;

        let lock = self.locks.for_student(invoice.student_id);
        let _guard = lock.lock().expect("student lock poisoned");

        let mut invoice = self
            .invoices
            .get(invoice_id)
            .ok_or(InvoicingError::InvoiceNotFound(invoice_id))?;

        let mut outstanding = invoice.balance_due();
        if !outstanding.is_positive() || !invoice.accepts_ledger_applications() {
            return Ok(AllocationOutcome {
                invoice_id: invoice.id,
                invoice_number: invoice.invoice_number,
                amount_applied: Money::zero(invoice.currency),
                remaining_balance: outstanding,
                applications: Vec::new(),
            });
        }

        // Plan the whole run before writing anything
        let mut plan: Vec<(StudentLedgerEntry, Money)> = Vec::new();
        for entry in self.ledger.open_credits_fifo(invoice.student_id) {
            if !outstanding.is_positive() {
                break;
            }
            let take = entry.remaining_amount.min(&outstanding)?;
            outstanding = outstanding.checked_sub(&take)?;
            plan.push((entry, take));
        }

        let mut applications = Vec::with_capacity(plan.len());
        let mut amount_applied = Money::zero(invoice.currency);
        for (mut entry, take) in plan {
            entry.apply(take)?;
            let application = LedgerApplication::new(
                entry.id,
                invoice.id,
                invoice.invoice_number.clone(),
                take,
                user,
            );
            self.ledger.record_application(entry, application.clone())?;
            invoice.apply_ledger_amount(take)?;
            amount_applied = amount_applied.checked_add(&take)?;
            applications.push(application);
        }
        self.invoices.update(invoice.clone())?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            amount_applied = %amount_applied,
            remaining_balance = %invoice.balance_due(),
            entries_used = applications.len(),
            applied_by = %user,
            "credits applied to invoice"
        );

        Ok(AllocationOutcome {
            invoice_id: invoice.id,
            invoice_number: invoice.invoice_number.clone(),
            amount_applied,
            remaining_balance: invoice.balance_due(),
            applications,
        })
    }

    /// Applies an explicit amount from one named entry to an invoice
    ///
    /// The manually-directed variant used for corrections: the operator
    /// chooses the entry and the amount instead of the FIFO walk.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an acting user
    /// - `Validation` for a non-positive amount
    /// - `InvoiceNotFound` / `EntryNotFound` for unknown targets
    /// - `InvalidOperation` when the invoice is already settled, the entry
    ///   belongs to another student, the amount exceeds the entry's
    ///   remaining amount, or it would push the invoice below zero
    pub fn apply_ledger_correction(
        &self,
        ctx: &ActorContext,
        invoice_id: InvoiceId,
        entry_id: LedgerEntryId,
        amount: Money,
    ) -> Result<AllocationOutcome, InvoicingError> {
        let user = ctx.require_user()?;

        if !amount.is_positive() {
            return Err(InvoicingError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }

        let invoice = self
            .invoices
            .get(invoice_id)
            .ok_or(InvoicingError::InvoiceNotFound(invoice_id))?;

        let lock = self.locks.for_student(invoice.student_id);
        let _guard = lock.lock().expect("student lock poisoned");

        let mut invoice: Invoice = self
            .invoices
            .get(invoice_id)
            .ok_or(InvoicingError::InvoiceNotFound(invoice_id))?;

        let outstanding = invoice.balance_due();
        if !outstanding.is_positive() || !invoice.accepts_ledger_applications() {
            return Err(InvoicingError::InvalidOperation(format!(
                "Invoice {} is already settled",
                invoice.invoice_number
            )));
        }

        let mut entry = self
            .ledger
            .get_entry(entry_id)
            .ok_or(domain_ledger::LedgerError::EntryNotFound(entry_id))?;
        if entry.student_id != invoice.student_id {
            return Err(InvoicingError::InvalidOperation(
                "Entry belongs to a different student".to_string(),
            ));
        }
        if amount.checked_sub(&outstanding)?.is_positive() {
            return Err(InvoicingError::InvalidOperation(format!(
                "Amount {} exceeds the outstanding balance {} of invoice {}",
                amount, outstanding, invoice.invoice_number
            )));
        }

        entry.apply(amount)?;
        let application = LedgerApplication::new(
            entry.id,
            invoice.id,
            invoice.invoice_number.clone(),
            amount,
            user,
        );
        self.ledger.record_application(entry, application.clone())?;
        invoice.apply_ledger_amount(amount)?;
        self.invoices.update(invoice.clone())?;

        info!(
            invoice_id = %invoice.id,
            entry_id = %entry_id,
            amount = %amount,
            applied_by = %user,
            "ledger correction applied"
        );

        Ok(AllocationOutcome {
            invoice_id: invoice.id,
            invoice_number: invoice.invoice_number.clone(),
            amount_applied: amount,
            remaining_balance: invoice.balance_due(),
            applications: vec![application],
        })
    }
}
