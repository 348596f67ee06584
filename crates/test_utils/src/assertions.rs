//! Custom Test Assertions
//!
//! Domain-specific assertion helpers. Each panics with a descriptive
//! message on violation, mirroring std assert macros.

use core_kernel::{Currency, Money};
use domain_ledger::{LedgerStore, StudentLedgerEntry};

/// Asserts the conservation invariant on one entry:
/// `applied_amount + remaining_amount == amount`
pub fn assert_entry_conserved(entry: &StudentLedgerEntry) {
    let sum = entry.applied_amount + entry.remaining_amount;
    assert_eq!(
        sum, entry.amount,
        "conservation violated for entry {}: applied {} + remaining {} != amount {}",
        entry.id, entry.applied_amount, entry.remaining_amount, entry.amount
    );
    assert!(
        !entry.remaining_amount.is_negative(),
        "entry {} has negative remaining amount {}",
        entry.id,
        entry.remaining_amount
    );
}

/// Asserts that the store's application records for an entry sum to the
/// entry's applied amount
pub fn assert_applications_match(store: &LedgerStore, entry: &StudentLedgerEntry) {
    let total = store
        .applications_for_entry(entry.id)
        .iter()
        .fold(Money::zero(entry.amount.currency()), |acc, a| {
            acc + a.amount
        });
    assert_eq!(
        total, entry.applied_amount,
        "application records for entry {} sum to {} but applied_amount is {}",
        entry.id, total, entry.applied_amount
    );
}

/// Asserts conservation across every entry of a student, including that
/// application records account for all applied value
pub fn assert_student_ledger_consistent(
    store: &LedgerStore,
    student_id: core_kernel::StudentId,
) {
    for entry in store.entries_for_student(student_id) {
        assert_entry_conserved(&entry);
        assert_applications_match(store, &entry);
    }
}

/// Asserts two amounts are equal with a money-aware failure message
pub fn assert_money_eq(actual: Money, expected: Money) {
    assert_eq!(
        actual, expected,
        "expected {} but got {}",
        expected, actual
    );
}

/// A zero in the school's billing currency, for fold seeds in tests
pub fn zero_eur() -> Money {
    Money::zero(Currency::EUR)
}
