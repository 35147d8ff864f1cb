//! Companion service implementing the companion ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    CompanionRepository, CompanionRepositoryError, CompanionsCommand, CompanionsQuery,
};
use crate::domain::{Companion, CompanionId, CompanionName, Error, UserId};

/// Companion service over a [`CompanionRepository`].
#[derive(Clone)]
pub struct CompanionsService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> CompanionsService<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

pub(crate) fn map_companion_error(error: CompanionRepositoryError) -> Error {
    match error {
        CompanionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("companion repository unavailable: {message}"))
        }
        CompanionRepositoryError::Query { message } => {
            Error::internal(format!("companion repository error: {message}"))
        }
        CompanionRepositoryError::DuplicateName { .. } => {
            Error::conflict("A companion with this name already exists")
        }
    }
}

fn not_found() -> Error {
    Error::not_found("Companion not found")
}

#[async_trait]
impl<R> CompanionsCommand for CompanionsService<R>
where
    R: CompanionRepository,
{
    async fn create(&self, user_id: &UserId, name: CompanionName) -> Result<Companion, Error> {
        let now = self.clock.utc();
        let companion = Companion {
            id: CompanionId::random(),
            user_id: *user_id,
            name: name.into(),
            created_at: now,
            updated_at: now,
        };
        self.repo
            .insert(&companion)
            .await
            .map_err(map_companion_error)?;
        Ok(companion)
    }

    async fn update(
        &self,
        user_id: &UserId,
        id: &CompanionId,
        name: Option<CompanionName>,
    ) -> Result<Companion, Error> {
        let mut companion = self
            .repo
            .find(user_id, id)
            .await
            .map_err(map_companion_error)?
            .ok_or_else(not_found)?;
        if let Some(name) = name {
            companion.name = name.into();
        }
        companion.updated_at = self.clock.utc();
        let stored = self
            .repo
            .update(&companion)
            .await
            .map_err(map_companion_error)?;
        if stored { Ok(companion) } else { Err(not_found()) }
    }

    async fn delete(&self, user_id: &UserId, id: &CompanionId) -> Result<(), Error> {
        let deleted = self
            .repo
            .delete(user_id, id)
            .await
            .map_err(map_companion_error)?;
        if deleted { Ok(()) } else { Err(not_found()) }
    }
}

#[async_trait]
impl<R> CompanionsQuery for CompanionsService<R>
where
    R: CompanionRepository,
{
    async fn list(&self, user_id: &UserId) -> Result<Vec<Companion>, Error> {
        self.repo.list(user_id).await.map_err(map_companion_error)
    }

    async fn get(&self, user_id: &UserId, id: &CompanionId) -> Result<Companion, Error> {
        self.repo
            .find(user_id, id)
            .await
            .map_err(map_companion_error)?
            .ok_or_else(not_found)
    }
}
