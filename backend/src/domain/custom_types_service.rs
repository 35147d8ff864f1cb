//! Custom coffee type service implementing the custom type ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    CustomTypeRepository, CustomTypeRepositoryError, CustomTypesCommand, CustomTypesQuery,
};
use crate::domain::{
    CustomCoffeeType, CustomTypeChanges, CustomTypeDraft, CustomTypeId, Error, UserId,
};

/// Custom type service over a [`CustomTypeRepository`].
#[derive(Clone)]
pub struct CustomTypesService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> CustomTypesService<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

pub(crate) fn map_custom_type_error(error: CustomTypeRepositoryError) -> Error {
    match error {
        CustomTypeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("custom type repository unavailable: {message}"))
        }
        CustomTypeRepositoryError::Query { message } => {
            Error::internal(format!("custom type repository error: {message}"))
        }
        CustomTypeRepositoryError::DuplicateName { .. } => {
            Error::conflict("A custom type with this name already exists")
        }
    }
}

fn not_found() -> Error {
    Error::not_found("Custom type not found")
}

#[async_trait]
impl<R> CustomTypesCommand for CustomTypesService<R>
where
    R: CustomTypeRepository,
{
    async fn create(
        &self,
        user_id: &UserId,
        draft: CustomTypeDraft,
    ) -> Result<CustomCoffeeType, Error> {
        let now = self.clock.utc();
        let custom_type = CustomCoffeeType {
            id: CustomTypeId::random(),
            user_id: *user_id,
            name: draft.name,
            caffeine_mg: draft.caffeine_mg,
            created_at: now,
            updated_at: now,
        };
        self.repo
            .insert(&custom_type)
            .await
            .map_err(map_custom_type_error)?;
        Ok(custom_type)
    }

    async fn update(
        &self,
        user_id: &UserId,
        id: &CustomTypeId,
        changes: CustomTypeChanges,
    ) -> Result<CustomCoffeeType, Error> {
        let current = self
            .repo
            .find(user_id, id)
            .await
            .map_err(map_custom_type_error)?
            .ok_or_else(not_found)?;
        let updated = changes.apply_to(current, self.clock.utc());
        let stored = self
            .repo
            .update(&updated)
            .await
            .map_err(map_custom_type_error)?;
        if stored { Ok(updated) } else { Err(not_found()) }
    }

    async fn delete(&self, user_id: &UserId, id: &CustomTypeId) -> Result<(), Error> {
        let deleted = self
            .repo
            .delete(user_id, id)
            .await
            .map_err(map_custom_type_error)?;
        if deleted { Ok(()) } else { Err(not_found()) }
    }
}

#[async_trait]
impl<R> CustomTypesQuery for CustomTypesService<R>
where
    R: CustomTypeRepository,
{
    async fn list(&self, user_id: &UserId) -> Result<Vec<CustomCoffeeType>, Error> {
        self.repo.list(user_id).await.map_err(map_custom_type_error)
    }

    async fn get(&self, user_id: &UserId, id: &CustomTypeId) -> Result<CustomCoffeeType, Error> {
        self.repo
            .find(user_id, id)
            .await
            .map_err(map_custom_type_error)?
            .ok_or_else(not_found)
    }
}
