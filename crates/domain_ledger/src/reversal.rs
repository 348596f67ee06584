//! Reversal of ledger entries
//!
//! A reversal cancels the economic effect of a prior entry by creating an
//! offsetting entry of the opposite type. The original is never deleted
//! and its amounts are never touched; it only gains a link to the
//! reversal and the `Reversed` status.

use std::sync::Arc;

use tracing::info;

use core_kernel::{ActorContext, LedgerEntryId};

use crate::entry::StudentLedgerEntry;
use crate::error::LedgerError;
use crate::locks::StudentLocks;
use crate::store::LedgerStore;

/// Creates offsetting entries for prior ledger entries
pub struct ReversalService {
    store: Arc<LedgerStore>,
    locks: Arc<StudentLocks>,
}

impl ReversalService {
    pub fn new(store: Arc<LedgerStore>, locks: Arc<StudentLocks>) -> Self {
        Self { store, locks }
    }

    /// Reverses an entry, returning the new offsetting entry
    ///
    /// The offsetting entry covers the original's *remaining* (un-applied)
    /// amount. Value already consumed by invoices stays accounted for;
    /// correcting it requires a credit invoice against the affected
    /// invoices, not a ledger reversal.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an acting user
    /// - `Validation` if the reason is empty or whitespace-only
    /// - `EntryNotFound` if the entry is unknown
    /// - `InvalidOperation` if the entry was already reversed or is fully
    ///   applied
    pub fn reverse_entry(
        &self,
        ctx: &ActorContext,
        entry_id: LedgerEntryId,
        reason: &str,
    ) -> Result<StudentLedgerEntry, LedgerError> {
        let user = ctx.require_user()?;

        if reason.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Reversal reason must not be empty".to_string(),
            ));
        }

        let entry = self
            .store
            .get_entry(entry_id)
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        let lock = self.locks.for_student(entry.student_id);
        let _guard = lock.lock().expect("student lock poisoned");

        // Re-read under the lock; a concurrent reversal may have won
        let mut original = self
            .store
            .get_entry(entry_id)
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        if original.reversed_by.is_some() {
            return Err(LedgerError::InvalidOperation(
                "Entry has already been reversed".to_string(),
            ));
        }
        if !original.remaining_amount.is_positive() {
            return Err(LedgerError::InvalidOperation(
                "Cannot reverse a fully applied entry".to_string(),
            ));
        }

        let reference = original
            .correction_ref
            .clone()
            .unwrap_or_else(|| original.id.to_string());
        let mut reversal = StudentLedgerEntry::new(
            original.student_id,
            original.entry_type.opposite(),
            original.remaining_amount,
            format!("Reversal of {}: {}", reference, reason),
            user,
        )?;
        if let Some(course_id) = original.course_id {
            reversal = reversal.with_course(course_id);
        }
        if let Some(correction_ref) = original.correction_ref.clone() {
            reversal = reversal.with_correction_ref(correction_ref);
        }

        original.mark_reversed(reversal.id)?;
        self.store.record_reversal(original, reversal.clone())?;

        info!(
            entry_id = %entry_id,
            reversal_id = %reversal.id,
            amount = %reversal.amount,
            reversed_by = %user,
            "ledger entry reversed"
        );

        Ok(reversal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryStatus, EntryType};
    use core_kernel::{Currency, Money, StudentId, UserId};
    use rust_decimal_macros::dec;

    fn eur(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }

    fn setup() -> (ReversalService, Arc<LedgerStore>) {
        let store = Arc::new(LedgerStore::new());
        let service = ReversalService::new(store.clone(), Arc::new(StudentLocks::new()));
        (service, store)
    }

    fn seed_credit(store: &LedgerStore, amount: rust_decimal::Decimal) -> StudentLedgerEntry {
        let entry = StudentLedgerEntry::new(
            StudentId::new(),
            EntryType::Credit,
            eur(amount),
            "Overpayment September",
            UserId::new(),
        )
        .unwrap()
        .with_correction_ref("CORR-2025-017");
        store.insert_entry(entry.clone());
        entry
    }

    #[test]
    fn test_reversal_creates_opposite_open_entry() {
        let (service, store) = setup();
        let entry = seed_credit(&store, dec!(100));
        let ctx = ActorContext::new(UserId::new());

        let reversal = service
            .reverse_entry(&ctx, entry.id, "Granted in error")
            .unwrap();

        assert_eq!(reversal.entry_type, EntryType::Debit);
        assert_eq!(reversal.amount, eur(dec!(100)));
        assert_eq!(reversal.status, EntryStatus::Open);
        assert_eq!(
            reversal.description,
            "Reversal of CORR-2025-017: Granted in error"
        );

        let original = store.get_entry(entry.id).unwrap();
        assert_eq!(original.status, EntryStatus::Reversed);
        assert_eq!(original.reversed_by, Some(reversal.id));
        // amounts untouched
        assert_eq!(original.remaining_amount, eur(dec!(100)));
    }

    #[test]
    fn test_partially_applied_entry_reverses_remaining_only() {
        let (service, store) = setup();
        let mut entry = seed_credit(&store, dec!(100));
        entry.apply(eur(dec!(60))).unwrap();
        store.update_entry(entry.clone()).unwrap();
        let ctx = ActorContext::new(UserId::new());

        let reversal = service.reverse_entry(&ctx, entry.id, "Course ended").unwrap();
        assert_eq!(reversal.amount, eur(dec!(40)));
    }

    #[test]
    fn test_fully_applied_entry_cannot_be_reversed() {
        let (service, store) = setup();
        let mut entry = seed_credit(&store, dec!(100));
        entry.apply(eur(dec!(100))).unwrap();
        store.update_entry(entry.clone()).unwrap();
        let ctx = ActorContext::new(UserId::new());

        let result = service.reverse_entry(&ctx, entry.id, "Too late");
        assert!(matches!(
            result,
            Err(LedgerError::InvalidOperation(msg)) if msg == "Cannot reverse a fully applied entry"
        ));
    }

    #[test]
    fn test_empty_reason_rejected() {
        let (service, store) = setup();
        let entry = seed_credit(&store, dec!(100));
        let ctx = ActorContext::new(UserId::new());

        for reason in ["", "   "] {
            let result = service.reverse_entry(&ctx, entry.id, reason);
            assert!(matches!(result, Err(LedgerError::Validation(_))));
        }
    }

    #[test]
    fn test_double_reversal_rejected() {
        let (service, store) = setup();
        let entry = seed_credit(&store, dec!(100));
        let ctx = ActorContext::new(UserId::new());

        service.reverse_entry(&ctx, entry.id, "First").unwrap();
        let second = service.reverse_entry(&ctx, entry.id, "Second");
        assert!(matches!(
            second,
            Err(LedgerError::InvalidOperation(msg)) if msg == "Entry has already been reversed"
        ));
    }

    #[test]
    fn test_reversal_requires_user() {
        let (service, store) = setup();
        let entry = seed_credit(&store, dec!(100));

        let result = service.reverse_entry(&ActorContext::anonymous(), entry.id, "No user");
        assert!(matches!(result, Err(LedgerError::Unauthorized)));
    }

    #[test]
    fn test_unknown_entry() {
        let (service, _) = setup();
        let ctx = ActorContext::new(UserId::new());

        let result = service.reverse_entry(&ctx, LedgerEntryId::new(), "Ghost");
        assert!(matches!(result, Err(LedgerError::EntryNotFound(_))));
    }
}
