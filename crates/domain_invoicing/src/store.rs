//! In-memory invoice store

use std::collections::HashMap;
use std::sync::RwLock;

use core_kernel::{EnrollmentId, InvoiceId, StudentId};

use crate::error::InvoicingError;
use crate::invoice::Invoice;

#[derive(Debug, Default)]
struct InvoiceState {
    invoices: HashMap<InvoiceId, Invoice>,
    by_student: HashMap<StudentId, Vec<InvoiceId>>,
    by_enrollment: HashMap<EnrollmentId, Vec<InvoiceId>>,
}

/// Owns all invoices
///
/// Read-modify-write sequences across calls are serialized by the caller
/// via the per-student locks; the store itself only guarantees each call
/// is atomic.
#[derive(Debug, Default)]
pub struct InvoiceStore {
    state: RwLock<InvoiceState>,
}

impl InvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new invoice
    pub fn insert(&self, invoice: Invoice) {
        let mut state = self.state.write().expect("invoice store poisoned");
        state
            .by_student
            .entry(invoice.student_id)
            .or_default()
            .push(invoice.id);
        state
            .by_enrollment
            .entry(invoice.enrollment_id)
            .or_default()
            .push(invoice.id);
        state.invoices.insert(invoice.id, invoice);
    }

    /// Returns a copy of an invoice
    pub fn get(&self, id: InvoiceId) -> Option<Invoice> {
        self.state
            .read()
            .expect("invoice store poisoned")
            .invoices
            .get(&id)
            .cloned()
    }

    /// Replaces an existing invoice
    pub fn update(&self, invoice: Invoice) -> Result<(), InvoicingError> {
        let mut state = self.state.write().expect("invoice store poisoned");
        if !state.invoices.contains_key(&invoice.id) {
            return Err(InvoicingError::InvoiceNotFound(invoice.id));
        }
        state.invoices.insert(invoice.id, invoice);
        Ok(())
    }

    /// All invoices for a student, oldest first
    pub fn invoices_for_student(&self, student_id: StudentId) -> Vec<Invoice> {
        let state = self.state.read().expect("invoice store poisoned");
        let mut invoices: Vec<Invoice> = state
            .by_student
            .get(&student_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.invoices.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        invoices.sort_by_key(|i| i.created_at);
        invoices
    }

    /// All invoices for an enrollment, oldest first
    pub fn invoices_for_enrollment(&self, enrollment_id: EnrollmentId) -> Vec<Invoice> {
        let state = self.state.read().expect("invoice store poisoned");
        let mut invoices: Vec<Invoice> = state
            .by_enrollment
            .get(&enrollment_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.invoices.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        invoices.sort_by_key(|i| i.created_at);
        invoices
    }
}
