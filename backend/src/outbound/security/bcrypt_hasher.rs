//! `PasswordHasher` backed by bcrypt.
//!
//! Hashing is CPU-bound, so both operations run on Tokio's blocking pool.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// bcrypt hasher with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl BcryptPasswordHasher {
    /// Override the work factor. bcrypt accepts 4 through 31.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

fn join_error(err: tokio::task::JoinError) -> PasswordHashError {
    PasswordHashError::hashing(format!("hashing task failed: {err}"))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let cost = self.cost;
        let password = zeroize::Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || bcrypt::hash(password.as_str(), cost))
            .await
            .map_err(join_error)?
            .map(PasswordHash::new)
            .map_err(|err| PasswordHashError::hashing(err.to_string()))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let password = zeroize::Zeroizing::new(password.to_owned());
        let hash = hash.as_str().to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password.as_str(), &hash))
            .await
            .map_err(join_error)?
            .map_err(|err| {
                warn!(error = %err, "stored password hash could not be checked");
                PasswordHashError::hashing(err.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::with_cost(4)
    }

    #[rstest]
    #[tokio::test]
    async fn hashes_verify_against_their_password(hasher: BcryptPasswordHasher) {
        let hash = hasher.hash("correct horse").await.expect("hash");

        assert_ne!(hash.as_str(), "correct horse");
        assert!(hasher.verify("correct horse", &hash).await.expect("verify"));
        assert!(!hasher.verify("battery staple", &hash).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn salts_differ_between_hashes(hasher: BcryptPasswordHasher) {
        let first = hasher.hash("espresso!").await.expect("hash");
        let second = hasher.hash("espresso!").await.expect("hash");

        assert_ne!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_hashes_are_errors(hasher: BcryptPasswordHasher) {
        let error = hasher
            .verify("anything", &PasswordHash::new("not-a-bcrypt-hash"))
            .await
            .expect_err("malformed");

        assert!(matches!(error, PasswordHashError::Hashing { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_costs_surface_as_errors() {
        let error = BcryptPasswordHasher::with_cost(99)
            .hash("espresso!")
            .await
            .expect_err("cost out of range");

        assert!(matches!(error, PasswordHashError::Hashing { .. }));
    }
}
