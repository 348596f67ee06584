//! Ledger entry creation

use std::sync::Arc;

use tracing::info;

use core_kernel::{ActorContext, CourseId, Money, StudentId};

use crate::entry::{EntryType, StudentLedgerEntry};
use crate::error::LedgerError;
use crate::store::{LedgerStore, StudentDirectory};

/// Request to create a ledger entry
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub student_id: StudentId,
    pub entry_type: EntryType,
    pub amount: Money,
    pub description: String,
    pub course_id: Option<CourseId>,
    pub correction_ref: Option<String>,
}

impl NewEntry {
    pub fn new(
        student_id: StudentId,
        entry_type: EntryType,
        amount: Money,
        description: impl Into<String>,
    ) -> Self {
        Self {
            student_id,
            entry_type,
            amount,
            description: description.into(),
            course_id: None,
            correction_ref: None,
        }
    }

    pub fn with_course(mut self, course_id: CourseId) -> Self {
        self.course_id = Some(course_id);
        self
    }

    pub fn with_correction_ref(mut self, correction_ref: impl Into<String>) -> Self {
        self.correction_ref = Some(correction_ref.into());
        self
    }
}

/// Creates credit and debit entries against student balances
pub struct LedgerService {
    store: Arc<LedgerStore>,
    students: Arc<dyn StudentDirectory>,
}

impl LedgerService {
    pub fn new(store: Arc<LedgerStore>, students: Arc<dyn StudentDirectory>) -> Self {
        Self { store, students }
    }

    /// Creates an open entry for a student
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an acting user
    /// - `Validation` if the amount is not positive
    /// - `StudentNotFound` if the student is unknown
    pub fn create_entry(
        &self,
        ctx: &ActorContext,
        request: NewEntry,
    ) -> Result<StudentLedgerEntry, LedgerError> {
        let user = ctx.require_user()?;

        if !self.students.student_exists(request.student_id) {
            return Err(LedgerError::StudentNotFound(request.student_id));
        }

        let mut entry = StudentLedgerEntry::new(
            request.student_id,
            request.entry_type,
            request.amount,
            request.description,
            user,
        )?;
        if let Some(course_id) = request.course_id {
            entry = entry.with_course(course_id);
        }
        if let Some(correction_ref) = request.correction_ref {
            entry = entry.with_correction_ref(correction_ref);
        }

        info!(
            entry_id = %entry.id,
            student_id = %entry.student_id,
            entry_type = ?entry.entry_type,
            amount = %entry.amount,
            created_by = %user,
            "ledger entry created"
        );

        self.store.insert_entry(entry.clone());
        Ok(entry)
    }
}
