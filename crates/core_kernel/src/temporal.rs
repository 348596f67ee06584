//! Billing period types
//!
//! A billing period is a closed date range an invoice covers. Enrollments
//! carry an invoicing cadence (`PeriodType`) that decides which batch run
//! picks them up.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors related to period handling
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod { start: String, end: String },
}

/// The invoicing cadence of an enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Monthly,
    Quarterly,
    Semester,
    Annual,
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PeriodType::Monthly => "monthly",
            PeriodType::Quarterly => "quarterly",
            PeriodType::Semester => "semester",
            PeriodType::Annual => "annual",
        };
        write!(f, "{}", label)
    }
}

/// A closed date range covered by an invoice (both ends inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BillingPeriod {
    /// Creates a new period, rejecting ranges where start is after end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Returns true if the date falls inside the period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true if this period overlaps with another
    pub fn overlaps(&self, other: &BillingPeriod) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of days in the period, inclusive of both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Human-readable label used in invoice descriptions
    pub fn label(&self) -> String {
        format!(
            "{} – {}",
            self.start.format("%-d %b %Y"),
            self.end.format("%-d %b %Y")
        )
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_creation() {
        let period = BillingPeriod::new(date(2025, 9, 1), date(2025, 9, 30)).unwrap();
        assert!(period.contains(date(2025, 9, 15)));
        assert!(!period.contains(date(2025, 10, 1)));
        assert_eq!(period.days(), 30);
    }

    #[test]
    fn test_inverted_period_rejected() {
        let result = BillingPeriod::new(date(2025, 10, 1), date(2025, 9, 1));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_single_day_period() {
        let period = BillingPeriod::new(date(2025, 9, 1), date(2025, 9, 1)).unwrap();
        assert_eq!(period.days(), 1);
        assert!(period.contains(date(2025, 9, 1)));
    }

    #[test]
    fn test_period_overlap() {
        let p1 = BillingPeriod::new(date(2025, 1, 1), date(2025, 6, 30)).unwrap();
        let p2 = BillingPeriod::new(date(2025, 6, 1), date(2025, 12, 31)).unwrap();
        let p3 = BillingPeriod::new(date(2025, 7, 1), date(2025, 12, 31)).unwrap();

        assert!(p1.overlaps(&p2));
        assert!(!p1.overlaps(&p3));
    }

    #[test]
    fn test_period_label() {
        let period = BillingPeriod::new(date(2025, 9, 1), date(2025, 9, 30)).unwrap();
        assert_eq!(period.label(), "1 Sep 2025 – 30 Sep 2025");
    }
}
