use reqwest::StatusCode;
use rust_decimal::Decimal;

use crate::api;

use super::{is_amount, is_postal_code, FieldErrors, Rejection, Validator};

#[test]
fn test_amount_format() {
    for ok in ["0.50", "12", "12.34", "0.5", "1000000"] {
        assert!(is_amount(ok), "{ok} should be accepted");
    }
    for bad in ["12.345", "-5", "", "012", "1,000", "0", "abc"] {
        assert!(!is_amount(bad), "{bad} should be rejected");
    }
}

#[test]
fn test_postal_code_format() {
    assert!(is_postal_code("10200"));
    assert!(is_postal_code("1"));
    assert!(is_postal_code("12345678901234"));
    assert!(!is_postal_code("ABC12"));
    assert!(!is_postal_code(""));
}

#[test]
fn test_text_limits_count_characters() {
    let mut v = Validator::new();
    // Two Thai characters are six bytes but two characters
    v.text("name", "Name", "บ้", 2, 100);
    v.text("full_name", "Recipient’s Name", "a", 2, 100);
    v.text("address_1", "Address 1", &"x".repeat(1001), 1, 1000);
    v.text("country", "Country", "   ", 1, 100);

    let errors = v.finish(()).unwrap_err();
    assert_eq!(None, errors.get("name"));
    assert_eq!(Some("Recipient’s Name must be 2-100 characters"), errors.get("full_name"));
    assert_eq!(Some("Address 1 must not exceed 1,000 characters"), errors.get("address_1"));
    assert_eq!(Some("Country is required"), errors.get("country"));
}

#[test]
fn test_first_message_per_field_wins() {
    let mut errors = FieldErrors::new();
    errors.insert("amount", "Amount exceeds your available balance");
    errors.insert("amount", "Amount must be at least 500");
    assert_eq!(Some("Amount exceeds your available balance"), errors.get("amount"));
    assert_eq!(1, errors.len());
}

#[test]
fn test_amount_minimum_is_inclusive() {
    let mut v = Validator::new();
    let price = v.amount("price", "Price", "1", Decimal::ONE, "Price must be at least 1");
    assert_eq!(Decimal::ONE, price);
    v.amount("shipping_price", "Price", "0.99", Decimal::ONE, "Price must be at least 1");
    v.amount("balance", "Balance", "12.345", Decimal::ONE, "unused");

    let errors = v.finish(()).unwrap_err();
    assert_eq!(Some("Price must be at least 1"), errors.get("shipping_price"));
    assert_eq!(Some("Invalid balance format"), errors.get("balance"));
}

#[test]
fn test_username_rules() {
    let mut v = Validator::new();
    v.username("a", "abcd");
    v.username("b", "abc de");
    v.username("c", "flexbuyer1");

    let errors = v.finish(()).unwrap_err();
    assert_eq!(Some("Username must be 5-50 characters"), errors.get("a"));
    assert_eq!(
        Some("Username can only contain letters (a-z, A-Z) and numbers (0-9)"),
        errors.get("b")
    );
    assert!(!errors.contains("c"));
}

#[test]
fn test_rejection_from_api() {
    let err = api::error::Error::StatusCodeFetchError(
        StatusCode::BAD_REQUEST,
        r#"{"error": "email_error"}"#.to_string(),
    );
    let rejection = Rejection::from_api(&err, "Failed to save user");
    assert_eq!(Some("Email already exists"), rejection.field_errors().get("email"));

    let err = api::error::Error::StatusCodeFetchError(StatusCode::UNAUTHORIZED, String::new());
    assert!(matches!(Rejection::from_api(&err, "x"), Rejection::Unauthorized));

    let err = api::error::Error::StatusCodeFetchError(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error": "failed to create address"}"#.to_string(),
    );
    let rejection = Rejection::from_api(&err, "Failed to create address");
    assert_eq!(Some("Failed to create address".to_string()), rejection.banner());
}
