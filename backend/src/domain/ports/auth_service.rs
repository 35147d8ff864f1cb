//! Driving port for registration, login and bearer-token authentication.
//!
//! Inbound adapters depend on this trait only, so handler tests can swap in a
//! double instead of wiring hashing, signing and persistence.

use async_trait::async_trait;

use crate::domain::{AuthSession, Error, LoginCredentials, Registration, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and sign the caller in.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Exchange credentials for a session.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    /// Load the profile of an authenticated user.
    async fn current_user(&self, user_id: &UserId) -> Result<User, Error>;

    /// Resolve a presented bearer token to its user.
    fn authenticate(&self, token: &str) -> Result<UserId, Error>;
}
