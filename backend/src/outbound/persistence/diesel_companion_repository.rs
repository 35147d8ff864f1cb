//! PostgreSQL-backed `CompanionRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CompanionRepository, CompanionRepositoryError};
use crate::domain::{Companion, CompanionId, UserId};
use crate::{query_optional, query_vec};

use super::diesel_helpers::RepositoryFailure;
use super::models::{CompanionRow, CompanionUpdate};
use super::pool::DbPool;
use super::schema::companions;

const NAME_CONSTRAINT: &str = "companions_user_name_key";

/// Diesel-backed implementation of the [`CompanionRepository`] port.
#[derive(Clone)]
pub struct DieselCompanionRepository {
    pool: DbPool,
}

impl DieselCompanionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn row_to_companion(row: CompanionRow) -> Companion {
    Companion {
        id: CompanionId::from(row.id),
        user_id: UserId::from(row.user_id),
        name: row.name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn claim_duplicate_name(constraint: Option<&str>, name: &str) -> Option<CompanionRepositoryError> {
    (constraint == Some(NAME_CONSTRAINT)).then(|| CompanionRepositoryError::duplicate_name(name))
}

#[async_trait]
impl CompanionRepository for DieselCompanionRepository {
    async fn insert(&self, companion: &Companion) -> Result<(), CompanionRepositoryError> {
        let row = CompanionRow {
            id: *companion.id.as_uuid(),
            user_id: *companion.user_id.as_uuid(),
            name: companion.name.clone(),
            created_at: companion.created_at,
            updated_at: companion.updated_at,
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(CompanionRepositoryError::from_pool)?;

        diesel::insert_into(companions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                CompanionRepositoryError::from_diesel_write(err, |constraint| {
                    claim_duplicate_name(constraint, &companion.name)
                })
            })
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<Companion>, CompanionRepositoryError> {
        query_vec!(
            self,
            CompanionRepositoryError,
            companions::table,
            companions::user_id.eq(user_id.as_uuid()),
            companions::name.asc(),
            CompanionRow,
            |row| Ok(row_to_companion(row))
        )
    }

    async fn find(
        &self,
        user_id: &UserId,
        id: &CompanionId,
    ) -> Result<Option<Companion>, CompanionRepositoryError> {
        query_optional!(
            self,
            CompanionRepositoryError,
            companions::table,
            companions::id
                .eq(id.as_uuid())
                .and(companions::user_id.eq(user_id.as_uuid())),
            CompanionRow,
            |row| Ok(row_to_companion(row))
        )
    }

    async fn find_many(
        &self,
        user_id: &UserId,
        ids: &[CompanionId],
    ) -> Result<Vec<Companion>, CompanionRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<_> = ids.iter().map(|id| *id.as_uuid()).collect();
        query_vec!(
            self,
            CompanionRepositoryError,
            companions::table,
            companions::id
                .eq_any(&uuids)
                .and(companions::user_id.eq(user_id.as_uuid())),
            companions::name.asc(),
            CompanionRow,
            |row| Ok(row_to_companion(row))
        )
    }

    async fn update(&self, companion: &Companion) -> Result<bool, CompanionRepositoryError> {
        let changeset = CompanionUpdate {
            name: &companion.name,
            updated_at: companion.updated_at,
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(CompanionRepositoryError::from_pool)?;

        let updated = diesel::update(companions::table)
            .filter(
                companions::id
                    .eq(companion.id.as_uuid())
                    .and(companions::user_id.eq(companion.user_id.as_uuid())),
            )
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                CompanionRepositoryError::from_diesel_write(err, |constraint| {
                    claim_duplicate_name(constraint, &companion.name)
                })
            })?;

        Ok(updated > 0)
    }

    async fn delete(
        &self,
        user_id: &UserId,
        id: &CompanionId,
    ) -> Result<bool, CompanionRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(CompanionRepositoryError::from_pool)?;

        // `entry_companions` rows cascade, detaching the companion from entries.
        let deleted = diesel::delete(
            companions::table.filter(
                companions::id
                    .eq(id.as_uuid())
                    .and(companions::user_id.eq(user_id.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(CompanionRepositoryError::from_diesel)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(NAME_CONSTRAINT), true)]
    #[case(Some("companions_pkey"), false)]
    #[case(None, false)]
    fn only_the_name_constraint_is_a_duplicate(
        #[case] constraint: Option<&str>,
        #[case] duplicate: bool,
    ) {
        let claimed = claim_duplicate_name(constraint, "Carmen");

        assert_eq!(claimed.is_some(), duplicate);
    }
}
