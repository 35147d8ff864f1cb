//! Authentication domain service implementing [`AuthService`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AuthService, PasswordHashError, PasswordHasher, TokenError, TokenService,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AuthSession, Error, LoginCredentials, Registration, User, UserAccount, UserId,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Registration, login and token verification over the user repository.
#[derive(Clone)]
pub struct AuthenticationService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, H, T> AuthenticationService<U, H, T> {
    /// Create a service from its collaborators.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail => Error::conflict("Email already in use"),
        UserPersistenceError::DuplicateUsername => Error::conflict("Username already taken"),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Expired | TokenError::Invalid { .. } => {
            Error::unauthorized("Invalid or expired token")
        }
        TokenError::Signing { message } => Error::internal(format!("token signing failed: {message}")),
    }
}

impl<U, H, T> AuthenticationService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    fn session_for(&self, user: User) -> Result<AuthSession, Error> {
        let token = self.tokens.issue(&user).map_err(map_token_error)?;
        Ok(AuthSession { user, token })
    }
}

#[async_trait]
impl<U, H, T> AuthService for AuthenticationService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        if self
            .users
            .email_exists(registration.email())
            .await
            .map_err(map_user_error)?
        {
            return Err(map_user_error(UserPersistenceError::duplicate_email()));
        }
        if self
            .users
            .username_exists(registration.username())
            .await
            .map_err(map_user_error)?
        {
            return Err(map_user_error(UserPersistenceError::duplicate_username()));
        }

        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;
        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            email: registration.email().clone(),
            username: registration.username().clone(),
            created_at: now,
            updated_at: now,
        };
        let account = UserAccount {
            user,
            password_hash,
        };
        self.users.create(&account).await.map_err(map_user_error)?;

        info!(user_id = %account.user.id, "user registered");
        self.session_for(account.user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let Some(account) = self
            .users
            .find_account_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let verified = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !verified {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        self.session_for(account.user)
    }

    async fn current_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    fn authenticate(&self, token: &str) -> Result<UserId, Error> {
        self.tokens.verify(token).map_err(map_token_error)
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
