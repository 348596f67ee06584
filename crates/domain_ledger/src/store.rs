//! In-memory ledger entry store
//!
//! The store owns the canonical `StudentLedgerEntry` and
//! `LedgerApplication` records. Writes that touch an entry and its
//! applications together go through combined methods so no reader can
//! observe one half of the pair. Read-modify-write sequences across calls
//! are serialized by the caller via [`crate::locks::StudentLocks`].

use std::collections::HashMap;
use std::sync::RwLock;

use core_kernel::{ApplicationId, Currency, InvoiceId, LedgerEntryId, Money, StudentId};

use crate::application::LedgerApplication;
use crate::entry::StudentLedgerEntry;
use crate::error::LedgerError;

/// Lookup for students, supplied by the enrollment/party layer
///
/// The billing core never owns student records; it only needs to know
/// whether a referenced student exists before attaching money to it.
pub trait StudentDirectory: Send + Sync {
    fn student_exists(&self, student_id: StudentId) -> bool;
}

/// Simple in-memory [`StudentDirectory`] for tests and embedding
#[derive(Debug, Default)]
pub struct StudentRegistry {
    students: RwLock<Vec<StudentId>>,
}

impl StudentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, student_id: StudentId) {
        self.students
            .write()
            .expect("student registry poisoned")
            .push(student_id);
    }
}

impl StudentDirectory for StudentRegistry {
    fn student_exists(&self, student_id: StudentId) -> bool {
        self.students
            .read()
            .expect("student registry poisoned")
            .contains(&student_id)
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    entries: HashMap<LedgerEntryId, StudentLedgerEntry>,
    entries_by_student: HashMap<StudentId, Vec<LedgerEntryId>>,
    applications: HashMap<ApplicationId, LedgerApplication>,
    applications_by_entry: HashMap<LedgerEntryId, Vec<ApplicationId>>,
    applications_by_invoice: HashMap<InvoiceId, Vec<ApplicationId>>,
}

/// Owns all ledger entries and their applications
#[derive(Debug, Default)]
pub struct LedgerStore {
    state: RwLock<LedgerState>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new entry
    pub fn insert_entry(&self, entry: StudentLedgerEntry) {
        let mut state = self.state.write().expect("ledger store poisoned");
        state
            .entries_by_student
            .entry(entry.student_id)
            .or_default()
            .push(entry.id);
        state.entries.insert(entry.id, entry);
    }

    /// Returns a copy of an entry
    pub fn get_entry(&self, id: LedgerEntryId) -> Option<StudentLedgerEntry> {
        self.state
            .read()
            .expect("ledger store poisoned")
            .entries
            .get(&id)
            .cloned()
    }

    /// Replaces an existing entry
    pub fn update_entry(&self, entry: StudentLedgerEntry) -> Result<(), LedgerError> {
        let mut state = self.state.write().expect("ledger store poisoned");
        if !state.entries.contains_key(&entry.id) {
            return Err(LedgerError::EntryNotFound(entry.id));
        }
        state.entries.insert(entry.id, entry);
        Ok(())
    }

    /// All entries for a student, oldest first
    pub fn entries_for_student(&self, student_id: StudentId) -> Vec<StudentLedgerEntry> {
        let state = self.state.read().expect("ledger store poisoned");
        let mut entries: Vec<StudentLedgerEntry> = state
            .entries_by_student
            .get(&student_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.entries.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by_key(|e| e.created_at);
        entries
    }

    /// Open credit entries with value left, oldest first (FIFO)
    pub fn open_credits_fifo(&self, student_id: StudentId) -> Vec<StudentLedgerEntry> {
        self.entries_for_student(student_id)
            .into_iter()
            .filter(|e| e.is_spendable_credit())
            .collect()
    }

    /// Sum of remaining amounts over the student's open credit entries
    pub fn available_credit(&self, student_id: StudentId, currency: Currency) -> Money {
        self.open_credits_fifo(student_id)
            .iter()
            .fold(Money::zero(currency), |acc, e| acc + e.remaining_amount)
    }

    /// Writes an updated entry together with a new application record
    ///
    /// Both halves of the pair land under one store lock so no reader can
    /// see the entry consumed without its application, or vice versa.
    pub fn record_application(
        &self,
        entry: StudentLedgerEntry,
        application: LedgerApplication,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write().expect("ledger store poisoned");
        if !state.entries.contains_key(&entry.id) {
            return Err(LedgerError::EntryNotFound(entry.id));
        }
        state.entries.insert(entry.id, entry);
        state
            .applications_by_entry
            .entry(application.entry_id)
            .or_default()
            .push(application.id);
        state
            .applications_by_invoice
            .entry(application.invoice_id)
            .or_default()
            .push(application.id);
        state.applications.insert(application.id, application);
        Ok(())
    }

    /// Writes the reversed original and its offsetting entry together
    pub fn record_reversal(
        &self,
        original: StudentLedgerEntry,
        reversal: StudentLedgerEntry,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write().expect("ledger store poisoned");
        if !state.entries.contains_key(&original.id) {
            return Err(LedgerError::EntryNotFound(original.id));
        }
        state.entries.insert(original.id, original);
        state
            .entries_by_student
            .entry(reversal.student_id)
            .or_default()
            .push(reversal.id);
        state.entries.insert(reversal.id, reversal);
        Ok(())
    }

    /// Applications recorded against an entry
    pub fn applications_for_entry(&self, entry_id: LedgerEntryId) -> Vec<LedgerApplication> {
        let state = self.state.read().expect("ledger store poisoned");
        state
            .applications_by_entry
            .get(&entry_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.applications.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Applications recorded against an invoice
    pub fn applications_for_invoice(&self, invoice_id: InvoiceId) -> Vec<LedgerApplication> {
        let state = self.state.read().expect("ledger store poisoned");
        state
            .applications_by_invoice
            .get(&invoice_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.applications.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}
