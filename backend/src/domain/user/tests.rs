//! Validation coverage for user value types.

use super::*;
use rstest::rstest;

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("no-at-sign.example", UserValidationError::InvalidEmail)]
#[case("two@@example.com", UserValidationError::InvalidEmail)]
#[case("missing@tld", UserValidationError::InvalidEmail)]
#[case("spaced out@example.com", UserValidationError::InvalidEmail)]
fn rejects_invalid_emails(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::new(raw), Err(expected));
}

#[rstest]
fn rejects_overlong_emails() {
    let raw = format!("{}@example.com", "a".repeat(250));
    assert_eq!(
        Email::new(raw),
        Err(UserValidationError::EmailTooLong { max: EMAIL_MAX })
    );
}

#[rstest]
fn email_is_trimmed() {
    let email = Email::new("  ada@example.com ").expect("valid email");
    assert_eq!(email.as_ref(), "ada@example.com");
}

#[rstest]
#[case("ab".to_owned(), UserValidationError::UsernameTooShort { min: USERNAME_MIN })]
#[case("a".repeat(31), UserValidationError::UsernameTooLong { max: USERNAME_MAX })]
#[case("has space".to_owned(), UserValidationError::UsernameInvalidCharacters)]
#[case("dash-name".to_owned(), UserValidationError::UsernameInvalidCharacters)]
fn rejects_invalid_usernames(
    #[case] raw: String,
    #[case] expected: UserValidationError,
) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
#[case("ada")]
#[case("barista_01")]
#[case("ABCDEFGHIJKLMNOPQRSTUVWXYZ_123")]
fn accepts_valid_usernames(#[case] raw: &str) {
    let username = Username::new(raw).expect("valid username");
    assert_eq!(username.as_ref(), raw);
}

#[rstest]
#[case(UserValidationError::InvalidEmail, "email", "invalid_format")]
#[case(UserValidationError::UsernameTooShort { min: 3 }, "username", "too_short")]
fn errors_expose_field_and_code(
    #[case] error: UserValidationError,
    #[case] field: &str,
    #[case] code: &str,
) {
    assert_eq!(error.field(), field);
    assert_eq!(error.code(), code);
}

#[rstest]
fn password_hash_debug_is_redacted() {
    let hash = PasswordHash::new("$2b$04$secret");
    assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
}
