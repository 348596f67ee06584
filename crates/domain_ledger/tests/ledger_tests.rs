//! Integration tests for the student ledger domain

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{ActorContext, Currency, InvoiceId, Money, StudentId, UserId};
use domain_ledger::{
    EntryStatus, EntryType, LedgerApplication, LedgerService, LedgerStore, NewEntry,
    ReversalService, StudentLocks, StudentRegistry,
};

fn eur(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::EUR)
}

struct World {
    store: Arc<LedgerStore>,
    ledger: LedgerService,
    reversals: ReversalService,
    student: StudentId,
    ctx: ActorContext,
}

fn world() -> World {
    let store = Arc::new(LedgerStore::new());
    let locks = Arc::new(StudentLocks::new());
    let registry = Arc::new(StudentRegistry::new());
    let student = StudentId::new();
    registry.register(student);

    World {
        ledger: LedgerService::new(store.clone(), registry),
        reversals: ReversalService::new(store.clone(), locks),
        store,
        student,
        ctx: ActorContext::new(UserId::new()),
    }
}

#[test]
fn entry_applications_sum_to_applied_amount() {
    let w = world();
    let entry = w
        .ledger
        .create_entry(
            &w.ctx,
            NewEntry::new(w.student, EntryType::Credit, eur(dec!(100)), "Credit"),
        )
        .unwrap();

    // Consume the entry in three chunks, recording an application per chunk
    let user = w.ctx.require_user().unwrap();
    for chunk in [dec!(25), dec!(40), dec!(35)] {
        let mut current = w.store.get_entry(entry.id).unwrap();
        current.apply(eur(chunk)).unwrap();
        let app = LedgerApplication::new(
            entry.id,
            InvoiceId::new(),
            "INV-2025-00042",
            eur(chunk),
            user,
        );
        w.store.record_application(current, app).unwrap();
    }

    let stored = w.store.get_entry(entry.id).unwrap();
    let applications = w.store.applications_for_entry(entry.id);

    let applied_via_records = applications
        .iter()
        .fold(Money::zero(Currency::EUR), |acc, a| acc + a.amount);
    assert_eq!(applied_via_records, stored.applied_amount);
    assert_eq!(stored.applied_amount + stored.remaining_amount, stored.amount);
    assert_eq!(stored.status, EntryStatus::Applied);
}

#[test]
fn reversal_of_created_entry_round_trip() {
    let w = world();
    let entry = w
        .ledger
        .create_entry(
            &w.ctx,
            NewEntry::new(w.student, EntryType::Debit, eur(dec!(30)), "Registration fee")
                .with_correction_ref("REG-2025-003"),
        )
        .unwrap();

    let reversal = w
        .reversals
        .reverse_entry(&w.ctx, entry.id, "Fee waived for scholarship")
        .unwrap();

    assert_eq!(reversal.entry_type, EntryType::Credit);
    assert_eq!(reversal.amount, eur(dec!(30)));
    assert!(reversal.description.contains("Reversal"));
    assert!(reversal.description.contains("REG-2025-003"));

    // The reversal is itself open and spendable like any other credit
    let credits = w.store.open_credits_fifo(w.student);
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].id, reversal.id);

    // The original no longer surfaces as spendable
    let original = w.store.get_entry(entry.id).unwrap();
    assert_eq!(original.status, EntryStatus::Reversed);
}

#[test]
fn reversed_credit_no_longer_counts_as_available() {
    let w = world();
    let entry = w
        .ledger
        .create_entry(
            &w.ctx,
            NewEntry::new(w.student, EntryType::Credit, eur(dec!(80)), "Credit"),
        )
        .unwrap();

    assert_eq!(w.store.available_credit(w.student, Currency::EUR), eur(dec!(80)));

    w.reversals
        .reverse_entry(&w.ctx, entry.id, "Mistake")
        .unwrap();

    // The offsetting debit does not count; the reversed credit is excluded
    assert!(w.store.available_credit(w.student, Currency::EUR).is_zero());
}

#[test]
fn concurrent_reversals_only_one_wins() {
    let w = world();
    let entry = w
        .ledger
        .create_entry(
            &w.ctx,
            NewEntry::new(w.student, EntryType::Credit, eur(dec!(50)), "Credit"),
        )
        .unwrap();

    let store = w.store.clone();
    let locks = Arc::new(StudentLocks::new());
    let service = Arc::new(ReversalService::new(store, locks));

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        let ctx = w.ctx;
        let entry_id = entry.id;
        handles.push(std::thread::spawn(move || {
            service.reverse_entry(&ctx, entry_id, &format!("attempt {}", i))
        }));
    }

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|r| r.is_ok())
        .count();
    assert_eq!(successes, 1);
}
