//! Student Ledger Domain
//!
//! This crate implements the student credit/debit ledger for the school
//! billing core. A ledger entry is a monetary fact (a credit the student
//! can spend, or a debit they owe); applications consume credit against
//! invoices; reversals offset prior entries without ever mutating them.
//!
//! # Conservation invariant
//!
//! For every entry, `applied_amount + remaining_amount == amount` at all
//! times, and the sum of an entry's application records equals its
//! `applied_amount`. Every unit of currency is accounted for exactly once.

pub mod application;
pub mod entry;
pub mod error;
pub mod locks;
pub mod reversal;
pub mod service;
pub mod store;

pub use application::LedgerApplication;
pub use entry::{EntryStatus, EntryType, StudentLedgerEntry};
pub use error::LedgerError;
pub use locks::StudentLocks;
pub use reversal::ReversalService;
pub use service::{LedgerService, NewEntry};
pub use store::{LedgerStore, StudentDirectory, StudentRegistry};
