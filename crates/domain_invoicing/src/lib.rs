//! Invoicing Domain - Invoice Lifecycle and Credit Allocation
//!
//! This crate implements the invoice side of the school billing core:
//!
//! - The invoice state machine (`Draft → Sent → {Paid, Overdue, Cancelled}`)
//!   with totals always derived from lines
//! - Invoice generation from billable activity, per enrollment and period,
//!   plus the batch driver with partial-failure semantics
//! - Credit invoices: negative-total invoices reversing selected lines of
//!   an issued invoice
//! - The credit allocation engine, matching open ledger credits against an
//!   invoice's outstanding balance FIFO under per-student serialization
//! - The print/export projection consumed by the PDF renderer
//!
//! Settled history is never mutated: corrections always create new
//! records (credit invoices, ledger applications, reversals) that
//! reference prior ones.

pub mod allocation;
pub mod billable;
pub mod credit;
pub mod error;
pub mod generation;
pub mod invoice;
pub mod numbering;
pub mod print;
pub mod store;

pub use allocation::{AllocationOutcome, CreditAllocationEngine};
pub use billable::{
    BillableActivity, BillableLine, BillableSource, EnrollmentBilling, InMemoryBillableSource,
};
pub use credit::CreditInvoiceService;
pub use error::InvoicingError;
pub use generation::{BatchGenerationOutcome, InvoiceGenerationService, SkippedEnrollment};
pub use invoice::{Invoice, InvoiceLine, InvoiceStatus, Payment, PaymentMethod};
pub use numbering::{InvoiceNumberSequence, CREDIT_PREFIX, STANDARD_PREFIX};
pub use print::{InvoicePrintView, SchoolBillingProfile};
pub use store::InvoiceStore;
