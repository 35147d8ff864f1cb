//! Port for companion persistence.

use async_trait::async_trait;

use crate::domain::{Companion, CompanionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by companion repository adapters.
    pub enum CompanionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "companion repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "companion repository query failed: {message}",
        /// The owner already has a companion with this name.
        DuplicateName { name: String } => "companion name already in use: {name}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanionRepository: Send + Sync {
    /// Persist a new companion.
    async fn insert(&self, companion: &Companion) -> Result<(), CompanionRepositoryError>;

    /// All companions owned by `user_id`, ordered by name.
    async fn list(&self, user_id: &UserId) -> Result<Vec<Companion>, CompanionRepositoryError>;

    /// Fetch one owned companion.
    async fn find(
        &self,
        user_id: &UserId,
        id: &CompanionId,
    ) -> Result<Option<Companion>, CompanionRepositoryError>;

    /// The subset of `ids` owned by `user_id`.
    async fn find_many(
        &self,
        user_id: &UserId,
        ids: &[CompanionId],
    ) -> Result<Vec<Companion>, CompanionRepositoryError>;

    /// Overwrite the stored row; `false` when no owned row matched.
    async fn update(&self, companion: &Companion) -> Result<bool, CompanionRepositoryError>;

    /// Delete an owned companion and detach it from entries; `false` when
    /// nothing matched.
    async fn delete(
        &self,
        user_id: &UserId,
        id: &CompanionId,
    ) -> Result<bool, CompanionRepositoryError>;
}
