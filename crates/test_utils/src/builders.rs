//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and take defaults for the rest.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    BillingPeriod, CourseId, Currency, EnrollmentId, Money, PeriodType, StudentId, UserId,
};
use domain_invoicing::{BillableActivity, BillableLine};
use domain_ledger::{EntryType, StudentLedgerEntry};

use crate::fixtures::{MoneyFixtures, PeriodFixtures};

/// Builder for ledger entries
pub struct LedgerEntryBuilder {
    student_id: StudentId,
    entry_type: EntryType,
    amount: Money,
    description: String,
    correction_ref: Option<String>,
    created_by: UserId,
}

impl Default for LedgerEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerEntryBuilder {
    pub fn new() -> Self {
        Self {
            student_id: StudentId::new(),
            entry_type: EntryType::Credit,
            amount: MoneyFixtures::monthly_tuition(),
            description: "Test credit".to_string(),
            correction_ref: None,
            created_by: UserId::new(),
        }
    }

    pub fn with_student(mut self, student_id: StudentId) -> Self {
        self.student_id = student_id;
        self
    }

    pub fn debit(mut self) -> Self {
        self.entry_type = EntryType::Debit;
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_correction_ref(mut self, correction_ref: impl Into<String>) -> Self {
        self.correction_ref = Some(correction_ref.into());
        self
    }

    pub fn with_created_by(mut self, user: UserId) -> Self {
        self.created_by = user;
        self
    }

    /// Builds the entry; panics on invalid input, which is what a test wants
    pub fn build(self) -> StudentLedgerEntry {
        let entry = StudentLedgerEntry::new(
            self.student_id,
            self.entry_type,
            self.amount,
            self.description,
            self.created_by,
        )
        .expect("builder produced an invalid entry");
        match self.correction_ref {
            Some(correction_ref) => entry.with_correction_ref(correction_ref),
            None => entry,
        }
    }
}

/// Builder for billable activity
pub struct BillableActivityBuilder {
    student_id: StudentId,
    enrollment_id: EnrollmentId,
    course_name: String,
    period_type: PeriodType,
    lesson_count: u32,
    lesson_price: Money,
    registration_fee: Option<Money>,
}

impl Default for BillableActivityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BillableActivityBuilder {
    pub fn new() -> Self {
        Self {
            student_id: StudentId::new(),
            enrollment_id: EnrollmentId::new(),
            course_name: "Piano".to_string(),
            period_type: PeriodType::Monthly,
            lesson_count: 4,
            lesson_price: Money::new(dec!(25), Currency::EUR),
            registration_fee: None,
        }
    }

    pub fn with_student(mut self, student_id: StudentId) -> Self {
        self.student_id = student_id;
        self
    }

    pub fn with_course_name(mut self, course_name: impl Into<String>) -> Self {
        self.course_name = course_name.into();
        self
    }

    pub fn with_period_type(mut self, period_type: PeriodType) -> Self {
        self.period_type = period_type;
        self
    }

    pub fn with_lessons(mut self, count: u32, price: Money) -> Self {
        self.lesson_count = count;
        self.lesson_price = price;
        self
    }

    pub fn without_lessons(mut self) -> Self {
        self.lesson_count = 0;
        self
    }

    pub fn with_registration_fee(mut self, fee: Money) -> Self {
        self.registration_fee = Some(fee);
        self
    }

    pub fn build(self) -> BillableActivity {
        let lines = if self.lesson_count == 0 {
            Vec::new()
        } else {
            vec![BillableLine {
                description: format!("{} lesson", self.course_name),
                quantity: Decimal::from(self.lesson_count),
                unit_price: self.lesson_price,
                vat_rate: MoneyFixtures::standard_vat(),
                lesson_id: None,
                lesson_date: None,
            }]
        };

        BillableActivity {
            student_id: self.student_id,
            enrollment_id: self.enrollment_id,
            course_id: CourseId::new(),
            course_name: self.course_name,
            period_type: self.period_type,
            lines,
            registration_fee: self.registration_fee,
        }
    }
}

/// The period most builder-based tests bill over
pub fn default_period() -> BillingPeriod {
    PeriodFixtures::september_2025()
}
