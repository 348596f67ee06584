//! Unit tests for the core error taxonomy

use core_kernel::{ActorContext, CoreError, Currency, Money, UserId};
use rust_decimal_macros::dec;

#[test]
fn test_constructor_helpers() {
    let validation = CoreError::validation("Amount must be greater than zero");
    assert!(matches!(validation, CoreError::Validation(_)));
    assert_eq!(
        validation.to_string(),
        "Validation error: Amount must be greater than zero"
    );

    let invalid = CoreError::invalid_operation("Cannot recalculate a paid invoice");
    assert_eq!(
        invalid.to_string(),
        "Invalid operation: Cannot recalculate a paid invoice"
    );

    let missing = CoreError::not_found("Student STU-123");
    assert_eq!(missing.to_string(), "Not found: Student STU-123");
}

#[test]
fn test_money_error_converts() {
    let eur = Money::new(dec!(1), Currency::EUR);
    let usd = Money::new(dec!(1), Currency::USD);

    let err: CoreError = eur.checked_add(&usd).unwrap_err().into();
    assert!(matches!(err, CoreError::Money(_)));
}

#[test]
fn test_unauthorized_from_anonymous_context() {
    let err = ActorContext::anonymous().require_user().unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized));
    assert_eq!(err.to_string(), "Unauthorized: no acting user");
}

#[test]
fn test_authorized_context_passes() {
    let user = UserId::new();
    assert_eq!(ActorContext::new(user).require_user().unwrap(), user);
}
