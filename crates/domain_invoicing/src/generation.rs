//! Invoice generation
//!
//! Turns billable activity into draft invoices, one per enrollment and
//! period. The batch driver iterates every enrollment due for a period
//! type; per-enrollment failures become skips and never roll back other
//! enrollments' invoices.

use std::sync::Arc;

use chrono::{Datelike, Duration, Utc};
use tracing::{info, warn};

use core_kernel::{ActorContext, BillingPeriod, EnrollmentId, InvoiceId, PeriodType};
use domain_ledger::{EntryType, LedgerStore, StudentLedgerEntry, StudentLocks};

use crate::billable::{BillableActivity, BillableSource};
use crate::error::InvoicingError;
use crate::invoice::{Invoice, InvoiceLine};
use crate::numbering::{InvoiceNumberSequence, STANDARD_PREFIX};
use crate::store::InvoiceStore;

/// Result of a batch generation run
#[derive(Debug)]
pub struct BatchGenerationOutcome {
    /// Invoices created, in enrollment order
    pub created: Vec<Invoice>,
    /// Enrollments that produced no invoice, with the reason
    pub skipped: Vec<SkippedEnrollment>,
}

/// An enrollment the batch run could not invoice
#[derive(Debug)]
pub struct SkippedEnrollment {
    pub enrollment_id: EnrollmentId,
    pub reason: String,
}

/// Builds draft invoices from billable activity
pub struct InvoiceGenerationService {
    invoices: Arc<InvoiceStore>,
    ledger: Arc<LedgerStore>,
    billable: Arc<dyn BillableSource>,
    numbers: Arc<InvoiceNumberSequence>,
    locks: Arc<StudentLocks>,
    /// Days between issue date and due date
    payment_term_days: i64,
}

impl InvoiceGenerationService {
    pub fn new(
        invoices: Arc<InvoiceStore>,
        ledger: Arc<LedgerStore>,
        billable: Arc<dyn BillableSource>,
        numbers: Arc<InvoiceNumberSequence>,
        locks: Arc<StudentLocks>,
        payment_term_days: i64,
    ) -> Self {
        Self {
            invoices,
            ledger,
            billable,
            numbers,
            locks,
            payment_term_days,
        }
    }

    /// Creates a draft invoice for one enrollment and period
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an acting user
    /// - `InvalidOperation` when the enrollment is unknown or has no
    ///   billable lessons in the period
    pub fn generate_invoice(
        &self,
        ctx: &ActorContext,
        enrollment_id: EnrollmentId,
        period: BillingPeriod,
    ) -> Result<Invoice, InvoicingError> {
        let user = ctx.require_user()?;

        let activity = self
            .billable
            .activity_for(enrollment_id, &period)
            .ok_or_else(|| {
                InvoicingError::InvalidOperation(format!(
                    "Enrollment {} has no billing data",
                    enrollment_id
                ))
            })?;
        if activity.lines.is_empty() {
            return Err(InvoicingError::InvalidOperation(
                "No lessons found for this period".to_string(),
            ));
        }

        let issue_date = Utc::now().date_naive();
        let due_date = issue_date + Duration::days(self.payment_term_days);
        let invoice_number = self.numbers.next(STANDARD_PREFIX, issue_date.year());
        let currency = activity.lines[0].unit_price.currency();

        let mut invoice = Invoice::new(
            invoice_number,
            activity.student_id,
            activity.enrollment_id,
            issue_date,
            due_date,
            period,
            activity.period_type,
            format!("{} tuition {}", activity.course_name, period.label()),
            currency,
        );
        invoice.replace_lines(build_lines(&activity))?;

        // First invoice for the enrollment also charges the registration fee
        if self.invoices.invoices_for_enrollment(enrollment_id).is_empty() {
            self.charge_registration_fee(&activity, user)?;
        }

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            enrollment_id = %enrollment_id,
            total = %invoice.total,
            created_by = %user,
            "invoice generated"
        );

        self.invoices.insert(invoice.clone());
        Ok(invoice)
    }

    /// Re-derives a draft invoice's lines and totals from current billable data
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an acting user
    /// - `InvoiceNotFound` for an unknown invoice
    /// - `InvalidOperation` ("Cannot recalculate a paid invoice") when the
    ///   invoice has left `Draft`, or when the period no longer has lessons
    pub fn recalculate_invoice(
        &self,
        ctx: &ActorContext,
        invoice_id: InvoiceId,
    ) -> Result<Invoice, InvoicingError> {
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
        if invoice.status != crate::invoice::InvoiceStatus::Draft {
            return Err(InvoicingError::InvalidOperation(
                "Cannot recalculate a paid invoice".to_string(),
            ));
        }

        let activity = self
            .billable
            .activity_for(invoice.enrollment_id, &invoice.period)
            .ok_or_else(|| {
                InvoicingError::InvalidOperation(format!(
                    "Enrollment {} has no billing data",
                    invoice.enrollment_id
                ))
            })?;
        if activity.lines.is_empty() {
            return Err(InvoicingError::InvalidOperation(
                "No lessons found for this period".to_string(),
            ));
        }

        invoice.replace_lines(build_lines(&activity))?;
        invoice.description = format!("{} tuition {}", activity.course_name, invoice.period.label());
        self.invoices.update(invoice.clone())?;

        info!(
            invoice_id = %invoice.id,
            total = %invoice.total,
            recalculated_by = %user,
            "invoice recalculated"
        );

        Ok(invoice)
    }

    /// Generates invoices for every enrollment due for the period type
    ///
    /// Enrollments are processed independently: one enrollment failing
    /// (most commonly with no lessons in the period) is recorded as a skip
    /// and the run continues.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an acting user
    /// - `InvalidOperation` when zero enrollments qualify
    pub fn generate_batch_invoices(
        &self,
        ctx: &ActorContext,
        period: BillingPeriod,
        period_type: PeriodType,
    ) -> Result<BatchGenerationOutcome, InvoicingError> {
        ctx.require_user()?;

        let enrollments = self.billable.billable_enrollments(period_type);
        if enrollments.is_empty() {
            return Err(InvoicingError::InvalidOperation(format!(
                "No enrollments are due for {} invoicing",
                period_type
            )));
        }

        let mut outcome = BatchGenerationOutcome {
            created: Vec::new(),
            skipped: Vec::new(),
        };
        for enrollment_id in enrollments {
            match self.generate_invoice(ctx, enrollment_id, period) {
                Ok(invoice) => outcome.created.push(invoice),
                Err(err) => {
                    warn!(
                        enrollment_id = %enrollment_id,
                        reason = %err,
                        "enrollment skipped during batch generation"
                    );
                    outcome.skipped.push(SkippedEnrollment {
                        enrollment_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            created = outcome.created.len(),
            skipped = outcome.skipped.len(),
            period = %period,
            "batch invoice generation finished"
        );

        Ok(outcome)
    }

    /// Records the one-time registration fee as a ledger debit
    fn charge_registration_fee(
        &self,
        activity: &BillableActivity,
        user: core_kernel::UserId,
    ) -> Result<(), InvoicingError> {
        let Some(fee) = activity.registration_fee else {
            return Ok(());
        };

        let entry = StudentLedgerEntry::new(
            activity.student_id,
            EntryType::Debit,
            fee,
            format!("Registration fee {}", activity.course_name),
            user,
        )?
        .with_course(activity.course_id);
        self.ledger.insert_entry(entry);
        Ok(())
    }
}

fn build_lines(activity: &BillableActivity) -> Vec<InvoiceLine> {
    activity
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let mut invoice_line = InvoiceLine::new(
                index as u32 + 1,
                line.description.clone(),
                line.quantity,
                line.unit_price,
                line.vat_rate,
            );
            if let Some(lesson_id) = line.lesson_id {
                invoice_line = invoice_line.with_lesson(lesson_id);
            }
            invoice_line
        })
        .collect()
}
