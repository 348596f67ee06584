//! Student ledger entries
//!
//! A ledger entry is a signed monetary fact attached to one student: a
//! credit the student can spend against invoices, or a debit the student
//! owes. Entries are never deleted and their face amount never changes;
//! corrections happen through offsetting reversal entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CourseId, LedgerEntryId, Money, StudentId, UserId};

use crate::error::LedgerError;

/// Whether an entry adds to or draws from the student's balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    /// Money the student has available (overpayment, grant, correction)
    Credit,
    /// Money the student owes outside an invoice (e.g. a registration fee)
    Debit,
}

impl EntryType {
    /// The offsetting type used by reversals
    pub fn opposite(&self) -> EntryType {
        match self {
            EntryType::Credit => EntryType::Debit,
            EntryType::Debit => EntryType::Credit,
        }
    }
}

/// Entry lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Has remaining amount available for application
    Open,
    /// Fully consumed by applications
    Applied,
    /// An offsetting reversal entry has been recorded against it
    Reversed,
}

/// A single credit or debit fact against a student's balance
///
/// # Invariants
///
/// - `applied_amount + remaining_amount == amount` after every mutation
/// - `remaining_amount >= 0`
/// - `amount` is positive and immutable after construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentLedgerEntry {
    /// Unique identifier
    pub id: LedgerEntryId,
    /// The student this entry belongs to
    pub student_id: StudentId,
    /// Credit or debit
    pub entry_type: EntryType,
    /// Face amount (always positive)
    pub amount: Money,
    /// Human-readable description
    pub description: String,
    /// Optional course this entry relates to
    pub course_id: Option<CourseId>,
    /// Optional human-readable correction code (e.g. "CORR-2025-017")
    pub correction_ref: Option<String>,
    /// Lifecycle status
    pub status: EntryStatus,
    /// Portion consumed by applications
    pub applied_amount: Money,
    /// Portion still available
    pub remaining_amount: Money,
    /// The reversal entry recorded against this one, if any
    pub reversed_by: Option<LedgerEntryId>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Acting user that created the entry
    pub created_by: UserId,
}

impl StudentLedgerEntry {
    /// Creates a new open entry
    ///
    /// # Errors
    ///
    /// Fails with `Validation` if the amount is not positive.
    pub fn new(
        student_id: StudentId,
        entry_type: EntryType,
        amount: Money,
        description: impl Into<String>,
        created_by: UserId,
    ) -> Result<Self, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            id: LedgerEntryId::new_v7(),
            student_id,
            entry_type,
            amount,
            description: description.into(),
            course_id: None,
            correction_ref: None,
            status: EntryStatus::Open,
            applied_amount: Money::zero(amount.currency()),
            remaining_amount: amount,
            reversed_by: None,
            created_at: Utc::now(),
            created_by,
        })
    }

    /// Sets the related course
    pub fn with_course(mut self, course_id: CourseId) -> Self {
        self.course_id = Some(course_id);
        self
    }

    /// Sets the human-readable correction code
    pub fn with_correction_ref(mut self, correction_ref: impl Into<String>) -> Self {
        self.correction_ref = Some(correction_ref.into());
        self
    }

    /// Consumes part of the remaining amount
    ///
    /// Moves `amount` from remaining to applied and flips the status to
    /// `Applied` exactly when the remainder reaches zero.
    ///
    /// # Errors
    ///
    /// - `Validation` if the amount is not positive
    /// - `InvalidOperation` if the entry is reversed or the amount exceeds
    ///   what remains
    pub fn apply(&mut self, amount: Money) -> Result<(), LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(
                "Applied amount must be greater than zero".to_string(),
            ));
        }
        if self.status == EntryStatus::Reversed {
            return Err(LedgerError::InvalidOperation(
                "Cannot apply a reversed entry".to_string(),
            ));
        }
        if amount.checked_sub(&self.remaining_amount)?.is_positive() {
            return Err(LedgerError::InvalidOperation(format!(
                "Insufficient remaining amount: requested {}, remaining {}",
                amount, self.remaining_amount
            )));
        }

        self.remaining_amount = self.remaining_amount.checked_sub(&amount)?;
        self.applied_amount = self.applied_amount.checked_add(&amount)?;
        if self.remaining_amount.is_zero() {
            self.status = EntryStatus::Applied;
        }

        Ok(())
    }

    /// Records the reversal link and marks this entry reversed
    ///
    /// The original keeps its amounts; only the status and link change.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if a reversal has already been recorded.
    pub fn mark_reversed(&mut self, reversal_id: LedgerEntryId) -> Result<(), LedgerError> {
        if self.reversed_by.is_some() {
            return Err(LedgerError::InvalidOperation(
                "Entry has already been reversed".to_string(),
            ));
        }
        self.reversed_by = Some(reversal_id);
        self.status = EntryStatus::Reversed;
        Ok(())
    }

    /// True if the entry is an open credit with value left to spend
    pub fn is_spendable_credit(&self) -> bool {
        self.status == EntryStatus::Open
            && self.entry_type == EntryType::Credit
            && self.remaining_amount.is_positive()
    }
}
