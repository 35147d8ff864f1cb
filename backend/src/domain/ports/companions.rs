//! Driving ports for companions.

use async_trait::async_trait;

use crate::domain::{Companion, CompanionId, CompanionName, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanionsCommand: Send + Sync {
    async fn create(&self, user_id: &UserId, name: CompanionName) -> Result<Companion, Error>;

    /// Rename a companion; `None` leaves the name unchanged.
    async fn update(
        &self,
        user_id: &UserId,
        id: &CompanionId,
        name: Option<CompanionName>,
    ) -> Result<Companion, Error>;

    async fn delete(&self, user_id: &UserId, id: &CompanionId) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanionsQuery: Send + Sync {
    /// Owned companions ordered by name.
    async fn list(&self, user_id: &UserId) -> Result<Vec<Companion>, Error>;

    async fn get(&self, user_id: &UserId, id: &CompanionId) -> Result<Companion, Error>;
}
