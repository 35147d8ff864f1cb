//! Driving ports for user-defined coffee types.

use async_trait::async_trait;

use crate::domain::{CustomCoffeeType, CustomTypeChanges, CustomTypeDraft, CustomTypeId, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomTypesCommand: Send + Sync {
    async fn create(
        &self,
        user_id: &UserId,
        draft: CustomTypeDraft,
    ) -> Result<CustomCoffeeType, Error>;

    async fn update(
        &self,
        user_id: &UserId,
        id: &CustomTypeId,
        changes: CustomTypeChanges,
    ) -> Result<CustomCoffeeType, Error>;

    async fn delete(&self, user_id: &UserId, id: &CustomTypeId) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomTypesQuery: Send + Sync {
    /// Owned custom types ordered by name.
    async fn list(&self, user_id: &UserId) -> Result<Vec<CustomCoffeeType>, Error>;

    async fn get(&self, user_id: &UserId, id: &CustomTypeId) -> Result<CustomCoffeeType, Error>;
}
