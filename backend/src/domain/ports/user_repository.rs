//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, User, UserAccount, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail => "email already registered",
        /// Another account already uses the username.
        DuplicateUsername => "username already registered",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account.
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the account, including its password hash, registered under `email`.
    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Whether an account already uses `email`.
    async fn email_exists(&self, email: &Email) -> Result<bool, UserPersistenceError>;

    /// Whether an account already uses `username`.
    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError>;
}
