//! Core Kernel - Foundational types for the school billing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Billing periods and invoicing cadence
//! - Strongly-typed identifiers and the acting-user context

pub mod context;
pub mod error;
pub mod identifiers;
pub mod money;
pub mod temporal;

pub use context::ActorContext;
pub use error::CoreError;
pub use identifiers::{
    ApplicationId, CourseId, EnrollmentId, InvoiceId, LedgerEntryId, LessonId, PaymentId,
    StudentId, TeacherId, UserId,
};
pub use money::{Currency, Money, MoneyError, VatRate};
pub use temporal::{BillingPeriod, PeriodType, TemporalError};
