//! Credit invoices
//!
//! A credit invoice reverses selected lines of an issued invoice. It is a
//! normal invoice with a negative total, linked to the original; the
//! original is never edited. Credit invoices follow the regular state
//! machine but can never themselves be credited.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::info;

use core_kernel::{ActorContext, Currency, InvoiceId, Money, StudentId};
use domain_ledger::LedgerStore;

use crate::error::InvoicingError;
use crate::invoice::{Invoice, InvoiceStatus};
use crate::numbering::{InvoiceNumberSequence, CREDIT_PREFIX};
use crate::store::InvoiceStore;

/// Creates and confirms credit invoices
pub struct CreditInvoiceService {
    invoices: Arc<InvoiceStore>,
    ledger: Arc<LedgerStore>,
    numbers: Arc<InvoiceNumberSequence>,
}

impl CreditInvoiceService {
    pub fn new(
        invoices: Arc<InvoiceStore>,
        ledger: Arc<LedgerStore>,
        numbers: Arc<InvoiceNumberSequence>,
    ) -> Self {
        Self {
            invoices,
            ledger,
            numbers,
        }
    }

    /// Creates a draft credit invoice for a subset of an invoice's lines
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an acting user
    /// - `Validation` for an empty selection or unknown line number
    /// - `InvoiceNotFound` for an unknown original
    /// - `InvalidOperation` when the original is a draft or itself a
    ///   credit invoice
    pub fn create_credit_invoice(
        &self,
        ctx: &ActorContext,
        original_invoice_id: InvoiceId,
        selected_line_nos: &[u32],
    ) -> Result<Invoice, InvoicingError> {
        let user = ctx.require_user()?;

        if selected_line_nos.is_empty() {
            return Err(InvoicingError::Validation(
                "At least one invoice line must be selected for crediting".to_string(),
            ));
        }

        let original = self
            .invoices
            .get(original_invoice_id)
            .ok_or(InvoicingError::InvoiceNotFound(original_invoice_id))?;
        if original.status == InvoiceStatus::Draft {
            return Err(InvoicingError::InvalidOperation(
                "Cannot create a credit invoice for a draft invoice".to_string(),
            ));
        }
        if original.is_credit_invoice {
            return Err(InvoicingError::InvalidOperation(
                "A credit invoice cannot itself be credited".to_string(),
            ));
        }

        let mut lines = Vec::with_capacity(selected_line_nos.len());
        for (index, line_no) in selected_line_nos.iter().enumerate() {
            let line = original
                .lines
                .iter()
                .find(|l| l.line_no == *line_no)
                .ok_or_else(|| {
                    InvoicingError::Validation(format!(
                        "Invoice line {} does not exist on invoice {}",
                        line_no, original.invoice_number
                    ))
                })?;
            lines.push(line.negated(index as u32 + 1));
        }

        let issue_date = Utc::now().date_naive();
        let invoice_number = self.numbers.next(CREDIT_PREFIX, issue_date.year());

        let mut credit = Invoice::new(
            invoice_number,
            original.student_id,
            original.enrollment_id,
            issue_date,
            issue_date,
            original.period,
            original.period_type,
            format!("Credit note for invoice {}", original.invoice_number),
            original.currency,
        )
        .as_credit_invoice(original.id);
        credit.replace_lines(lines)?;

        info!(
            credit_invoice_id = %credit.id,
            credit_invoice_number = %credit.invoice_number,
            original_invoice = %original.invoice_number,
            total = %credit.total,
            created_by = %user,
            "credit invoice created"
        );

        self.invoices.insert(credit.clone());
        Ok(credit)
    }

    /// Transitions a credit invoice out of `Draft`
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an acting user
    /// - `InvoiceNotFound` for an unknown invoice
    /// - `InvalidOperation` ("This invoice is not a credit invoice") when
    ///   pointed at a regular invoice, or when it already left `Draft`
    pub fn confirm_credit_invoice(
        &self,
        ctx: &ActorContext,
        credit_invoice_id: InvoiceId,
    ) -> Result<Invoice, InvoicingError> {
        let user = ctx.require_user()?;

        let mut invoice = self
            .invoices
            .get(credit_invoice_id)
            .ok_or(InvoicingError::InvoiceNotFound(credit_invoice_id))?;
        if !invoice.is_credit_invoice {
            return Err(InvoicingError::InvalidOperation(
                "This invoice is not a credit invoice".to_string(),
            ));
        }

        invoice.mark_sent()?;
        self.invoices.update(invoice.clone())?;

        info!(
            credit_invoice_id = %invoice.id,
            confirmed_by = %user,
            "credit invoice confirmed"
        );

        Ok(invoice)
    }

    /// Sum of remaining amounts over the student's open credit entries
    pub fn available_credit(&self, student_id: StudentId, currency: Currency) -> Money {
        self.ledger.available_credit(student_id, currency)
    }
}
