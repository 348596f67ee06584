//! Pre-built Test Fixtures
//!
//! Ready-made values for the entities the test suite touches most:
//! amounts, periods, names, and the school billing profile.

use chrono::NaiveDate;
use fake::faker::name::en::Name;
use fake::Fake;
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{BillingPeriod, Currency, Money, VatRate};
use domain_invoicing::SchoolBillingProfile;

/// Common monetary amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn eur(minor_units: i64) -> Money {
        Money::from_minor(minor_units, Currency::EUR)
    }

    /// A month of weekly lessons: 100.00
    pub fn monthly_tuition() -> Money {
        Money::new(dec!(100), Currency::EUR)
    }

    /// One-time registration fee: 30.00
    pub fn registration_fee() -> Money {
        Money::new(dec!(30), Currency::EUR)
    }

    /// The standard VAT rate the school charges
    pub fn standard_vat() -> VatRate {
        VatRate::from_percentage(dec!(21))
    }
}

/// Common billing periods
pub struct PeriodFixtures;

impl PeriodFixtures {
    pub fn september_2025() -> BillingPeriod {
        BillingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
        )
        .unwrap()
    }

    pub fn october_2025() -> BillingPeriod {
        BillingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
        )
        .unwrap()
    }

    pub fn fall_semester_2025() -> BillingPeriod {
        BillingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
        .unwrap()
    }
}

/// Name and text fixtures
pub struct StringFixtures;

impl StringFixtures {
    /// A plausible student display name
    pub fn student_name() -> String {
        Name().fake()
    }

    pub fn course_name() -> &'static str {
        "Piano"
    }
}

static SCHOOL_PROFILE: Lazy<SchoolBillingProfile> = Lazy::new(|| SchoolBillingProfile {
    school_name: "Muziekschool Cadenza".to_string(),
    address_lines: vec![
        "Hoofdstraat 12".to_string(),
        "1011 AB Amsterdam".to_string(),
    ],
    vat_number: "NL123456789B01".to_string(),
    registration_number: "12345678".to_string(),
    iban: "NL91ABNA0417164300".to_string(),
});

/// The school billing profile used across print tests
pub fn school_profile() -> SchoolBillingProfile {
    SCHOOL_PROFILE.clone()
}
