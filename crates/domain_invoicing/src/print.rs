//! Print/export projection
//!
//! Assembles everything a PDF or print renderer needs for one invoice:
//! school billing header, lines with VAT breakdown, payments, ledger
//! applications, and the balance due. This module only assembles data;
//! rendering lives outside the core.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::Money;
use domain_ledger::LedgerApplication;

use crate::invoice::{Invoice, PaymentMethod};

/// School billing/header metadata, typically loaded from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolBillingProfile {
    pub school_name: String,
    pub address_lines: Vec<String>,
    pub vat_number: String,
    pub registration_number: String,
    pub iban: String,
}

/// One line as it appears on the rendered invoice
#[derive(Debug, Clone, Serialize)]
pub struct PrintLine {
    pub line_no: u32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Money,
    pub vat_percentage: Decimal,
    pub net_total: Money,
    pub vat_amount: Money,
    pub gross_total: Money,
}

/// One payment as it appears on the rendered invoice
#[derive(Debug, Clone, Serialize)]
pub struct PrintPayment {
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}

/// One ledger application as it appears on the rendered invoice
#[derive(Debug, Clone, Serialize)]
pub struct PrintApplication {
    pub amount: Money,
    pub applied_at: DateTime<Utc>,
}

/// Read-only projection of one invoice for rendering
#[derive(Debug, Clone, Serialize)]
pub struct InvoicePrintView {
    pub school: SchoolBillingProfile,
    pub invoice_number: String,
    pub student_name: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub period_label: String,
    pub description: String,
    pub is_credit_invoice: bool,
    pub original_invoice_number: Option<String>,
    pub lines: Vec<PrintLine>,
    pub subtotal: Money,
    pub vat_amount: Money,
    pub total: Money,
    pub payments: Vec<PrintPayment>,
    pub applications: Vec<PrintApplication>,
    pub balance_due: Money,
    pub notes: Option<String>,
}

impl InvoicePrintView {
    /// Assembles the projection for one invoice
    pub fn assemble(
        school: SchoolBillingProfile,
        invoice: &Invoice,
        applications: &[LedgerApplication],
        student_name: impl Into<String>,
        original_invoice_number: Option<String>,
    ) -> Self {
        Self {
            school,
            invoice_number: invoice.invoice_number.clone(),
            student_name: student_name.into(),
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            period_label: invoice.period.label(),
            description: invoice.description.clone(),
            is_credit_invoice: invoice.is_credit_invoice,
            original_invoice_number,
            lines: invoice
                .lines
                .iter()
                .map(|line| PrintLine {
                    line_no: line.line_no,
                    description: line.description.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    vat_percentage: line.vat_rate.as_percentage(),
                    net_total: line.net_total(),
                    vat_amount: line.vat_amount(),
                    gross_total: line.gross_total(),
                })
                .collect(),
            subtotal: invoice.subtotal,
            vat_amount: invoice.vat_amount,
            total: invoice.total,
            payments: invoice
                .payments
                .iter()
                .map(|p| PrintPayment {
                    amount: p.amount,
                    method: p.method,
                    paid_at: p.paid_at,
                })
                .collect(),
            applications: applications
                .iter()
                .map(|a| PrintApplication {
                    amount: a.amount,
                    applied_at: a.applied_at,
                })
                .collect(),
            balance_due: invoice.balance_due(),
            notes: invoice.notes.clone(),
        }
    }
}
