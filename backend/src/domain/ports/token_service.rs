//! Port for issuing and verifying bearer tokens.

use crate::domain::{AuthToken, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The token is past its expiry.
        Expired => "token expired",
        /// The token is malformed or its signature does not verify.
        Invalid { message: String } => "invalid token: {message}",
        /// A token could not be produced.
        Signing { message: String } => "token signing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a token identifying `user`.
    fn issue(&self, user: &User) -> Result<AuthToken, TokenError>;

    /// Verify a presented token and return the user it identifies.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
