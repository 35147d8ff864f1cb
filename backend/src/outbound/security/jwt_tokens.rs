//! `TokenService` issuing HS256 JSON Web Tokens.
//!
//! Expiry is checked against the injected clock rather than the system time
//! so tests can pin "now".

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{AuthToken, User, UserId};

/// Lifetime of a freshly issued token, in seconds (seven days).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// HS256 token service keyed by a shared secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> Result<AuthToken, TokenError> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AuthToken::new)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            })?;
        if data.claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        Uuid::parse_str(&data.claims.sub)
            .map(UserId::from)
            .map_err(|_| TokenError::invalid("subject is not a user id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, Username};
    use crate::test_support::{fixture_clock, fixture_now};
    use rstest::rstest;

    const SECRET: &[u8] = b"brewlog-test-secret";

    fn user() -> User {
        User {
            id: UserId::random(),
            email: Email::new("ada@example.com").expect("email"),
            username: Username::new("ada").expect("username"),
            created_at: fixture_now(),
            updated_at: fixture_now(),
        }
    }

    fn service_at(offset: Duration) -> JwtTokenService {
        JwtTokenService::new(
            SECRET,
            Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            fixture_clock(fixture_now() + offset),
        )
    }

    #[rstest]
    fn issued_tokens_identify_the_user() {
        let user = user();
        let service = service_at(Duration::zero());

        let token = service.issue(&user).expect("issue");

        assert_eq!(service.verify(token.as_str()).expect("verify"), user.id);
    }

    #[rstest]
    #[case(Duration::days(6), true)]
    #[case(Duration::days(7), false)]
    #[case(Duration::days(30), false)]
    fn tokens_expire_after_the_ttl(#[case] later: Duration, #[case] valid: bool) {
        let token = service_at(Duration::zero()).issue(&user()).expect("issue");

        let result = service_at(later).verify(token.as_str());

        assert_eq!(result.is_ok(), valid);
        if !valid {
            assert_eq!(result, Err(TokenError::Expired));
        }
    }

    #[rstest]
    fn tokens_from_another_secret_are_invalid() {
        let foreign = JwtTokenService::new(
            b"someone-else",
            Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            fixture_clock(fixture_now()),
        )
        .issue(&user())
        .expect("issue");

        let error = service_at(Duration::zero())
            .verify(foreign.as_str())
            .expect_err("wrong key");

        assert!(matches!(error, TokenError::Invalid { .. }));
    }

    #[rstest]
    #[case("")]
    #[case("not.a.jwt")]
    #[case("Bearer abc")]
    fn garbage_is_invalid(#[case] token: &str) {
        let error = service_at(Duration::zero()).verify(token).expect_err("garbage");

        assert!(matches!(error, TokenError::Invalid { .. }));
    }
}
