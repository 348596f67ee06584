//! Property-Based Test Generators
//!
//! Proptest strategies for domain values.

use proptest::prelude::*;

use core_kernel::{Currency, Money};
use domain_ledger::EntryType;

/// Positive EUR amounts between one cent and the given ceiling (in cents)
pub fn money_up_to(max_minor: i64) -> impl Strategy<Value = Money> {
    (1..=max_minor).prop_map(|minor| Money::from_minor(minor, Currency::EUR))
}

/// Positive EUR amounts up to 10,000.00
pub fn any_money() -> impl Strategy<Value = Money> {
    money_up_to(1_000_000)
}

/// Either entry type
pub fn any_entry_type() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Credit), Just(EntryType::Debit)]
}
