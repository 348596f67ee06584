//! Invoice lifecycle
//!
//! An invoice is a billing document for one student covering one period.
//! Totals are always derived from the lines; payments and ledger
//! applications reduce the balance due. Once an invoice leaves `Draft` its
//! lines are frozen; corrections happen through credit invoices.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{
    BillingPeriod, Currency, EnrollmentId, InvoiceId, LessonId, Money, PaymentId, PeriodType,
    StudentId, UserId, VatRate,
};

use crate::error::InvoicingError;

/// Invoice status
///
/// `Draft → Sent → {Paid, Overdue, Cancelled}`. `Overdue` is set by an
/// external date-based driver; `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

/// One billable item on an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Integer line id, unique within the invoice, used to select lines
    /// for crediting
    pub line_no: u32,
    /// Description
    pub description: String,
    /// Quantity
    pub quantity: Decimal,
    /// Price per unit (negative on credit invoices)
    pub unit_price: Money,
    /// VAT rate applied to the net amount
    pub vat_rate: VatRate,
    /// Reference back to the billable source, if any
    pub lesson_id: Option<LessonId>,
}

impl InvoiceLine {
    pub fn new(
        line_no: u32,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Money,
        vat_rate: VatRate,
    ) -> Self {
        Self {
            line_no,
            description: description.into(),
            quantity,
            unit_price,
            vat_rate,
            lesson_id: None,
        }
    }

    pub fn with_lesson(mut self, lesson_id: LessonId) -> Self {
        self.lesson_id = Some(lesson_id);
        self
    }

    /// Net amount: quantity × unit price, rounded to currency places
    pub fn net_total(&self) -> Money {
        self.unit_price.multiply(self.quantity).round_to_currency()
    }

    /// VAT on the net amount
    pub fn vat_amount(&self) -> Money {
        self.vat_rate.apply(&self.net_total())
    }

    /// Net plus VAT
    pub fn gross_total(&self) -> Money {
        self.net_total() + self.vat_amount()
    }

    /// A copy with the unit price negated, for credit invoices
    pub fn negated(&self, line_no: u32) -> Self {
        Self {
            line_no,
            description: self.description.clone(),
            quantity: self.quantity,
            unit_price: -self.unit_price,
            vat_rate: self.vat_rate,
            lesson_id: self.lesson_id,
        }
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    BankTransfer,
    DirectDebit,
    Card,
    Cash,
}

/// A payment recorded against an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub method: PaymentMethod,
    /// External reference (bank statement line, terminal receipt)
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub recorded_by: UserId,
}

impl Payment {
    pub fn new(invoice_id: InvoiceId, amount: Money, method: PaymentMethod, recorded_by: UserId) -> Self {
        Self {
            id: PaymentId::new_v7(),
            invoice_id,
            amount,
            method,
            reference: None,
            paid_at: Utc::now(),
            recorded_by,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// A billing document for one student covering one period
///
/// # Invariants
///
/// - `total == subtotal + vat_amount`, all three derived from the lines
/// - `total` is negative exactly when `is_credit_invoice`
/// - balance due = `total − payments − amount_applied`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Unique, human-readable, sequential per year
    pub invoice_number: String,
    pub student_id: StudentId,
    pub enrollment_id: EnrollmentId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub period: BillingPeriod,
    pub period_type: PeriodType,
    /// Summary of what the invoice covers
    pub description: String,
    pub currency: Currency,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Money,
    pub vat_amount: Money,
    pub total: Money,
    pub payments: Vec<Payment>,
    /// Running sum of ledger applications recorded against this invoice
    pub amount_applied: Money,
    pub is_credit_invoice: bool,
    /// The invoice a credit invoice corrects
    pub original_invoice_id: Option<InvoiceId>,
    pub notes: Option<String>,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates an empty draft invoice
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        invoice_number: impl Into<String>,
        student_id: StudentId,
        enrollment_id: EnrollmentId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        period: BillingPeriod,
        period_type: PeriodType,
        description: impl Into<String>,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            invoice_number: invoice_number.into(),
            student_id,
            enrollment_id,
            issue_date,
            due_date,
            period,
            period_type,
            description: description.into(),
            currency,
            lines: Vec::new(),
            subtotal: Money::zero(currency),
            vat_amount: Money::zero(currency),
            total: Money::zero(currency),
            payments: Vec::new(),
            amount_applied: Money::zero(currency),
            is_credit_invoice: false,
            original_invoice_id: None,
            notes: None,
            status: InvoiceStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks this invoice as a credit invoice for `original_invoice_id`
    pub fn as_credit_invoice(mut self, original_invoice_id: InvoiceId) -> Self {
        self.is_credit_invoice = true;
        self.original_invoice_id = Some(original_invoice_id);
        self
    }

    /// Replaces the lines and re-derives the totals
    ///
    /// # Errors
    ///
    /// `InvalidOperation` ("Cannot recalculate a paid invoice") when the
    /// invoice is no longer in `Draft`.
    pub fn replace_lines(&mut self, lines: Vec<InvoiceLine>) -> Result<(), InvoicingError> {
        if self.status != InvoiceStatus::Draft {
            return Err(InvoicingError::InvalidOperation(
                "Cannot recalculate a paid invoice".to_string(),
            ));
        }
        self.lines = lines;
        self.recalculate_totals();
        self.updated_at = Utc::now();
        Ok(())
    }

    fn recalculate_totals(&mut self) {
        self.subtotal = self
            .lines
            .iter()
            .fold(Money::zero(self.currency), |acc, line| acc + line.net_total());
        self.vat_amount = self
            .lines
            .iter()
            .fold(Money::zero(self.currency), |acc, line| acc + line.vat_amount());
        self.total = self.subtotal + self.vat_amount;
    }

    /// Sum of recorded payments
    pub fn payments_total(&self) -> Money {
        self.payments
            .iter()
            .fold(Money::zero(self.currency), |acc, p| acc + p.amount)
    }

    /// `total − payments − ledger applications`
    ///
    /// Negative for credit invoices until refunded/offset; allocation
    /// never drives a regular invoice below zero.
    pub fn balance_due(&self) -> Money {
        self.total - self.payments_total() - self.amount_applied
    }

    /// True if the invoice can still receive ledger applications
    pub fn accepts_ledger_applications(&self) -> bool {
        self.status != InvoiceStatus::Cancelled
    }

    /// Records a payment and settles the invoice when the balance hits zero
    ///
    /// # Errors
    ///
    /// `InvalidOperation` unless the invoice is `Sent` or `Overdue`.
    pub fn record_payment(&mut self, payment: Payment) -> Result<(), InvoicingError> {
        if !matches!(self.status, InvoiceStatus::Sent | InvoiceStatus::Overdue) {
            return Err(InvoicingError::InvalidOperation(format!(
                "Cannot record a payment on a {} invoice",
                self.status
            )));
        }
        self.payments.push(payment);
        self.settle_if_paid();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Increases the applied-credit sum and settles when the balance hits zero
    ///
    /// Ledger applications are also permitted on drafts: credit that is
    /// already on the student's balance may offset an invoice before it is
    /// issued.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when the invoice is cancelled.
    pub fn apply_ledger_amount(&mut self, amount: Money) -> Result<(), InvoicingError> {
        if !self.accepts_ledger_applications() {
            return Err(InvoicingError::InvalidOperation(
                "Cannot apply credit to a cancelled invoice".to_string(),
            ));
        }
        self.amount_applied = self.amount_applied.checked_add(&amount)?;
        self.settle_if_paid();
        self.updated_at = Utc::now();
        Ok(())
    }

    fn settle_if_paid(&mut self) {
        if self.balance_due().is_zero() && !self.total.is_zero() {
            self.status = InvoiceStatus::Paid;
        }
    }

    /// Issues the invoice
    ///
    /// # Errors
    ///
    /// `InvalidOperation` unless the invoice is in `Draft`.
    pub fn mark_sent(&mut self) -> Result<(), InvoicingError> {
        if self.status != InvoiceStatus::Draft {
            return Err(InvoicingError::InvalidOperation(format!(
                "Cannot send a {} invoice",
                self.status
            )));
        }
        self.status = InvoiceStatus::Sent;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Flags a sent invoice as overdue (driven by the external date batch)
    ///
    /// # Errors
    ///
    /// `InvalidOperation` unless the invoice is `Sent`.
    pub fn mark_overdue(&mut self) -> Result<(), InvoicingError> {
        if self.status != InvoiceStatus::Sent {
            return Err(InvoicingError::InvalidOperation(format!(
                "Cannot mark a {} invoice overdue",
                self.status
            )));
        }
        self.status = InvoiceStatus::Overdue;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Cancels the invoice; terminal
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when the invoice is paid or already cancelled.
    pub fn cancel(&mut self) -> Result<(), InvoicingError> {
        if matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) {
            return Err(InvoicingError::InvalidOperation(format!(
                "Cannot cancel a {} invoice",
                self.status
            )));
        }
        self.status = InvoiceStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Date-based overdue check; does not change state
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date
            && !matches!(
                self.status,
                InvoiceStatus::Paid | InvoiceStatus::Cancelled
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft_invoice() -> Invoice {
        let period = BillingPeriod::new(date(2025, 9, 1), date(2025, 9, 30)).unwrap();
        let mut invoice = Invoice::new(
            "INV-2025-00001",
            StudentId::new(),
            EnrollmentId::new(),
            date(2025, 10, 1),
            date(2025, 10, 15),
            period,
            PeriodType::Monthly,
            "Piano tuition 1 Sep 2025 – 30 Sep 2025",
            Currency::EUR,
        );
        invoice
            .replace_lines(vec![InvoiceLine::new(
                1,
                "Piano lesson",
                dec!(4),
                eur(dec!(25)),
                VatRate::from_percentage(dec!(21)),
            )])
            .unwrap();
        invoice
    }

    #[test]
    fn test_totals_derived_from_lines() {
        let invoice = draft_invoice();
        assert_eq!(invoice.subtotal, eur(dec!(100)));
        assert_eq!(invoice.vat_amount, eur(dec!(21)));
        assert_eq!(invoice.total, eur(dec!(121)));
        assert_eq!(invoice.total, invoice.subtotal + invoice.vat_amount);
    }

    #[test]
    fn test_replace_lines_blocked_after_send() {
        let mut invoice = draft_invoice();
        invoice.mark_sent().unwrap();

        let result = invoice.replace_lines(vec![]);
        assert!(matches!(
            result,
            Err(InvoicingError::InvalidOperation(msg)) if msg == "Cannot recalculate a paid invoice"
        ));
    }

    #[test]
    fn test_payment_settles_invoice() {
        let mut invoice = draft_invoice();
        invoice.mark_sent().unwrap();

        let payment = Payment::new(invoice.id, eur(dec!(121)), PaymentMethod::BankTransfer, UserId::new());
        invoice.record_payment(payment).unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert!(invoice.balance_due().is_zero());
    }

    #[test]
    fn test_partial_payment_keeps_invoice_open() {
        let mut invoice = draft_invoice();
        invoice.mark_sent().unwrap();

        let payment = Payment::new(invoice.id, eur(dec!(100)), PaymentMethod::Cash, UserId::new());
        invoice.record_payment(payment).unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Sent);
        assert_eq!(invoice.balance_due(), eur(dec!(21)));
    }

    #[test]
    fn test_payment_rejected_on_draft() {
        let mut invoice = draft_invoice();
        let payment = Payment::new(invoice.id, eur(dec!(10)), PaymentMethod::Card, UserId::new());
        assert!(matches!(
            invoice.record_payment(payment),
            Err(InvoicingError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_ledger_application_settles_invoice() {
        let mut invoice = draft_invoice();
        invoice.mark_sent().unwrap();

        invoice.apply_ledger_amount(eur(dec!(121))).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_cancel_is_terminal_and_blocks_applications() {
        let mut invoice = draft_invoice();
        invoice.cancel().unwrap();

        assert!(matches!(
            invoice.apply_ledger_amount(eur(dec!(1))),
            Err(InvoicingError::InvalidOperation(_))
        ));
        assert!(matches!(
            invoice.cancel(),
            Err(InvoicingError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_cancel_paid_invoice_rejected() {
        let mut invoice = draft_invoice();
        invoice.mark_sent().unwrap();
        invoice.apply_ledger_amount(eur(dec!(121))).unwrap();

        assert!(matches!(
            invoice.cancel(),
            Err(InvoicingError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_is_overdue_is_date_based() {
        let mut invoice = draft_invoice();
        invoice.mark_sent().unwrap();

        assert!(!invoice.is_overdue(date(2025, 10, 15)));
        assert!(invoice.is_overdue(date(2025, 10, 16)));

        invoice.apply_ledger_amount(eur(dec!(121))).unwrap();
        assert!(!invoice.is_overdue(date(2025, 12, 1)));
    }

    #[test]
    fn test_negated_line() {
        let line = InvoiceLine::new(
            1,
            "Guitar lesson",
            dec!(2),
            eur(dec!(30)),
            VatRate::from_percentage(dec!(21)),
        );
        let negated = line.negated(1);

        assert_eq!(negated.net_total(), eur(dec!(-60)));
        assert_eq!(negated.gross_total(), -line.gross_total());
    }

    #[test]
    fn test_line_numbers_survive_negation() {
        let line = InvoiceLine::new(
            3,
            "Exam fee",
            dec!(1),
            eur(dec!(45)),
            VatRate::exempt(),
        );
        assert_eq!(line.negated(1).line_no, 1);
    }

    #[test]
    fn test_credit_invoice_balance_settles_upward() {
        let period = BillingPeriod::new(date(2025, 9, 1), date(2025, 9, 30)).unwrap();
        let mut credit = Invoice::new(
            "CRN-2025-00001",
            StudentId::new(),
            EnrollmentId::new(),
            date(2025, 10, 1),
            date(2025, 10, 1),
            period,
            PeriodType::Monthly,
            "Credit note for invoice INV-2025-00001",
            Currency::EUR,
        )
        .as_credit_invoice(InvoiceId::new());
        credit
            .replace_lines(vec![InvoiceLine::new(
                1,
                "Piano lesson",
                dec!(1),
                eur(dec!(-25)),
                VatRate::from_percentage(dec!(21)),
            )])
            .unwrap();

        assert_eq!(credit.total, eur(dec!(-30.25)));
        assert!(credit.total.is_negative());

        // Refund offsets the negative balance upward to zero
        credit.mark_sent().unwrap();
        credit.apply_ledger_amount(eur(dec!(-30.25))).unwrap();
        assert_eq!(credit.status, InvoiceStatus::Paid);
    }
}
