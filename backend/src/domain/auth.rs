//! Authentication primitives: registration input, login credentials and the
//! issued session.
//!
//! Inbound payload parsing stays outside the domain; handlers hand raw strings
//! to these constructors before calling a port.

use std::fmt;

use zeroize::Zeroizing;

use super::{Email, FieldIssue, User, UserValidationError, Username};

/// Minimum allowed password length.
pub const PASSWORD_MIN: usize = 8;
/// Maximum allowed password length.
pub const PASSWORD_MAX: usize = 128;

/// Validation error raised by [`LoginCredentials::try_from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl LoginValidationError {
    /// Convert into the field issue reported to clients.
    pub fn to_issue(&self) -> FieldIssue {
        match self {
            Self::EmptyEmail => FieldIssue::new("email", "required", self.to_string()),
            Self::EmptyPassword => FieldIssue::new("password", "required", self.to_string()),
        }
    }
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Credentials presented at login.
///
/// ## Invariants
/// - `email` is trimmed and non-empty. It is not format-checked: an unknown
///   address simply fails authentication.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use brewlog::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "hunter22").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: Email,
    username: Username,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate every field, collecting all issues rather than stopping at
    /// the first.
    pub fn try_from_parts(
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        let issue = |err: UserValidationError| FieldIssue::new(err.field(), err.code(), err.to_string());

        let email = Email::new(email).map_err(|err| issues.push(issue(err))).ok();
        let username = Username::new(username)
            .map_err(|err| issues.push(issue(err)))
            .ok();

        let length = password.chars().count();
        if length < PASSWORD_MIN {
            issues.push(FieldIssue::new(
                "password",
                "too_short",
                format!("password must be at least {PASSWORD_MIN} characters"),
            ));
        } else if length > PASSWORD_MAX {
            issues.push(FieldIssue::new(
                "password",
                "too_long",
                format!("password must be at most {PASSWORD_MAX} characters"),
            ));
        }

        match (email, username) {
            (Some(email), Some(username)) if issues.is_empty() => Ok(Self {
                email,
                username,
                password: Zeroizing::new(password.to_owned()),
            }),
            _ => Err(issues),
        }
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Signed bearer token handed to clients.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

impl From<AuthToken> for String {
    fn from(value: AuthToken) -> Self {
        value.0
    }
}

/// Outcome of a successful registration or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: User,
    pub token: AuthToken,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("ada@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_login_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_keeps_password_whitespace() {
        let creds =
            LoginCredentials::try_from_parts("ada@example.com", " padded ").expect("valid");
        assert_eq!(creds.password(), " padded ");
    }

    #[rstest]
    fn registration_accepts_valid_input() {
        let registration = Registration::try_from_parts("ada@example.com", "ada_l", "password1")
            .expect("valid registration");
        assert_eq!(registration.email().as_ref(), "ada@example.com");
        assert_eq!(registration.username().as_ref(), "ada_l");
        assert_eq!(registration.password(), "password1");
    }

    #[rstest]
    fn registration_reports_every_invalid_field() {
        let issues = Registration::try_from_parts("nope", "a", "short")
            .expect_err("all fields invalid");
        let fields: Vec<&str> = issues.iter().map(|issue| issue.field.as_str()).collect();
        assert_eq!(fields, ["email", "username", "password"]);
    }

    #[rstest]
    #[case(7, Some("too_short"))]
    #[case(8, None)]
    #[case(128, None)]
    #[case(129, Some("too_long"))]
    fn registration_password_bounds(#[case] length: usize, #[case] code: Option<&str>) {
        let password = "x".repeat(length);
        let result = Registration::try_from_parts("ada@example.com", "ada", &password);
        match code {
            None => assert!(result.is_ok()),
            Some(expected) => {
                let issues = result.expect_err("password out of bounds");
                assert_eq!(issues[0].code, expected);
            }
        }
    }

    #[rstest]
    fn token_debug_is_redacted() {
        assert_eq!(format!("{:?}", AuthToken::new("abc.def.ghi")), "AuthToken(..)");
    }
}
