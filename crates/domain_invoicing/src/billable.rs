//! Billable-source boundary
//!
//! Enrollment and scheduling data live outside this core. What crosses the
//! boundary is the set of billable line candidates for one enrollment and
//! period, plus the header metadata needed to populate an invoice. The
//! in-memory implementation backs the test suite and small embeddings.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BillingPeriod, CourseId, EnrollmentId, LessonId, Money, PeriodType, StudentId, VatRate};

/// One billable line candidate from the schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillableLine {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Money,
    pub vat_rate: VatRate,
    /// The scheduled lesson this line bills, if it bills a single lesson
    pub lesson_id: Option<LessonId>,
    /// Lesson date; lines without a date (flat tuition) bill in any period
    pub lesson_date: Option<NaiveDate>,
}

/// Everything needed to build one invoice for one enrollment and period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillableActivity {
    pub student_id: StudentId,
    pub enrollment_id: EnrollmentId,
    pub course_id: CourseId,
    pub course_name: String,
    /// The enrollment's invoicing cadence
    pub period_type: PeriodType,
    pub lines: Vec<BillableLine>,
    /// One-time fee charged to the student ledger on first invoicing
    pub registration_fee: Option<Money>,
}

/// Supplies billable activity; implemented by the enrollment/course layer
pub trait BillableSource: Send + Sync {
    /// Billable activity for one enrollment restricted to a period;
    /// `None` when the enrollment is unknown
    fn activity_for(
        &self,
        enrollment_id: EnrollmentId,
        period: &BillingPeriod,
    ) -> Option<BillableActivity>;

    /// Enrollments whose invoicing preference matches the period type and
    /// that are currently billable
    fn billable_enrollments(&self, period_type: PeriodType) -> Vec<EnrollmentId>;
}

/// An enrollment registered with the in-memory source
#[derive(Debug, Clone)]
pub struct EnrollmentBilling {
    pub activity: BillableActivity,
    /// Billable at all (left by students who paused or quit)
    pub active: bool,
}

/// In-memory [`BillableSource`] for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryBillableSource {
    enrollments: RwLock<HashMap<EnrollmentId, EnrollmentBilling>>,
}

impl InMemoryBillableSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, billing: EnrollmentBilling) {
        self.enrollments
            .write()
            .expect("billable source poisoned")
            .insert(billing.activity.enrollment_id, billing);
    }
}

impl BillableSource for InMemoryBillableSource {
    fn activity_for(
        &self,
        enrollment_id: EnrollmentId,
        period: &BillingPeriod,
    ) -> Option<BillableActivity> {
        let enrollments = self.enrollments.read().expect("billable source poisoned");
        let billing = enrollments.get(&enrollment_id)?;

        let mut activity = billing.activity.clone();
        activity.lines.retain(|line| match line.lesson_date {
            Some(date) => period.contains(date),
            None => true,
        });
        Some(activity)
    }

    fn billable_enrollments(&self, period_type: PeriodType) -> Vec<EnrollmentId> {
        let enrollments = self.enrollments.read().expect("billable source poisoned");
        let mut ids: Vec<EnrollmentId> = enrollments
            .values()
            .filter(|b| b.active && b.activity.period_type == period_type)
            .map(|b| b.activity.enrollment_id)
            .collect();
        ids.sort_by_key(|id| *id.as_uuid());
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn lesson_line(date: Option<NaiveDate>) -> BillableLine {
        BillableLine {
            description: "Violin lesson".to_string(),
            quantity: dec!(1),
            unit_price: Money::new(dec!(35), Currency::EUR),
            vat_rate: VatRate::from_percentage(dec!(21)),
            lesson_id: Some(LessonId::new()),
            lesson_date: date,
        }
    }

    fn activity(lines: Vec<BillableLine>) -> BillableActivity {
        BillableActivity {
            student_id: StudentId::new(),
            enrollment_id: EnrollmentId::new(),
            course_id: CourseId::new(),
            course_name: "Violin".to_string(),
            period_type: PeriodType::Monthly,
            lines,
            registration_fee: None,
        }
    }

    #[test]
    fn test_lines_filtered_to_period() {
        let source = InMemoryBillableSource::new();
        let period = BillingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
        )
        .unwrap();

        let activity = activity(vec![
            lesson_line(Some(NaiveDate::from_ymd_opt(2025, 9, 10).unwrap())),
            lesson_line(Some(NaiveDate::from_ymd_opt(2025, 10, 3).unwrap())),
            lesson_line(None),
        ]);
        let enrollment_id = activity.enrollment_id;
        source.upsert(EnrollmentBilling {
            activity,
            active: true,
        });

        let result = source.activity_for(enrollment_id, &period).unwrap();
        assert_eq!(result.lines.len(), 2);
    }

    #[test]
    fn test_unknown_enrollment_is_none() {
        let source = InMemoryBillableSource::new();
        let period = BillingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
        )
        .unwrap();
        assert!(source.activity_for(EnrollmentId::new(), &period).is_none());
    }

    #[test]
    fn test_billable_enrollments_filters_cadence_and_active() {
        let source = InMemoryBillableSource::new();

        let monthly = activity(vec![lesson_line(None)]);
        let monthly_id = monthly.enrollment_id;
        source.upsert(EnrollmentBilling {
            activity: monthly,
            active: true,
        });

        let mut quarterly = activity(vec![lesson_line(None)]);
        quarterly.period_type = PeriodType::Quarterly;
        source.upsert(EnrollmentBilling {
            activity: quarterly,
            active: true,
        });

        let inactive = activity(vec![lesson_line(None)]);
        source.upsert(EnrollmentBilling {
            activity: inactive,
            active: false,
        });

        let ids = source.billable_enrollments(PeriodType::Monthly);
        assert_eq!(ids, vec![monthly_id]);
    }
}
