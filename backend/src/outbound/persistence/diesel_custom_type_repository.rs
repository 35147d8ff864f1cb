//! PostgreSQL-backed `CustomTypeRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CustomTypeRepository, CustomTypeRepositoryError};
use crate::domain::{CustomCoffeeType, CustomTypeId, UserId};
use crate::{query_optional, query_vec};

use super::diesel_helpers::{RepositoryFailure, non_negative, to_column};
use super::models::{CustomTypeRow, CustomTypeUpdate};
use super::pool::DbPool;
use super::schema::custom_coffee_types;

const NAME_CONSTRAINT: &str = "custom_coffee_types_user_name_key";

/// Diesel-backed implementation of the [`CustomTypeRepository`] port.
#[derive(Clone)]
pub struct DieselCustomTypeRepository {
    pool: DbPool,
}

impl DieselCustomTypeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn row_to_custom_type(
    row: CustomTypeRow,
) -> Result<CustomCoffeeType, CustomTypeRepositoryError> {
    Ok(CustomCoffeeType {
        id: CustomTypeId::from(row.id),
        user_id: UserId::from(row.user_id),
        name: row.name,
        caffeine_mg: row
            .caffeine_mg
            .map(|mg| non_negative(mg, "caffeine_mg"))
            .transpose()?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn claim_duplicate_name(
    constraint: Option<&str>,
    name: &str,
) -> Option<CustomTypeRepositoryError> {
    (constraint == Some(NAME_CONSTRAINT)).then(|| CustomTypeRepositoryError::duplicate_name(name))
}

fn caffeine_column(
    custom_type: &CustomCoffeeType,
) -> Result<Option<i32>, CustomTypeRepositoryError> {
    custom_type
        .caffeine_mg
        .map(|mg| to_column(mg, "caffeine_mg"))
        .transpose()
}

#[async_trait]
impl CustomTypeRepository for DieselCustomTypeRepository {
    async fn insert(
        &self,
        custom_type: &CustomCoffeeType,
    ) -> Result<(), CustomTypeRepositoryError> {
        let row = CustomTypeRow {
            id: *custom_type.id.as_uuid(),
            user_id: *custom_type.user_id.as_uuid(),
            name: custom_type.name.clone(),
            caffeine_mg: caffeine_column(custom_type)?,
            created_at: custom_type.created_at,
            updated_at: custom_type.updated_at,
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(CustomTypeRepositoryError::from_pool)?;

        diesel::insert_into(custom_coffee_types::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                CustomTypeRepositoryError::from_diesel_write(err, |constraint| {
                    claim_duplicate_name(constraint, &custom_type.name)
                })
            })
    }

    async fn list(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CustomCoffeeType>, CustomTypeRepositoryError> {
        query_vec!(
            self,
            CustomTypeRepositoryError,
            custom_coffee_types::table,
            custom_coffee_types::user_id.eq(user_id.as_uuid()),
            custom_coffee_types::name.asc(),
            CustomTypeRow,
            row_to_custom_type
        )
    }

    async fn find(
        &self,
        user_id: &UserId,
        id: &CustomTypeId,
    ) -> Result<Option<CustomCoffeeType>, CustomTypeRepositoryError> {
        query_optional!(
            self,
            CustomTypeRepositoryError,
            custom_coffee_types::table,
            custom_coffee_types::id
                .eq(id.as_uuid())
                .and(custom_coffee_types::user_id.eq(user_id.as_uuid())),
            CustomTypeRow,
            row_to_custom_type
        )
    }

    async fn update(
        &self,
        custom_type: &CustomCoffeeType,
    ) -> Result<bool, CustomTypeRepositoryError> {
        let changeset = CustomTypeUpdate {
            name: &custom_type.name,
            caffeine_mg: caffeine_column(custom_type)?,
            updated_at: custom_type.updated_at,
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(CustomTypeRepositoryError::from_pool)?;

        let updated = diesel::update(custom_coffee_types::table)
            .filter(
                custom_coffee_types::id
                    .eq(custom_type.id.as_uuid())
                    .and(custom_coffee_types::user_id.eq(custom_type.user_id.as_uuid())),
            )
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                CustomTypeRepositoryError::from_diesel_write(err, |constraint| {
                    claim_duplicate_name(constraint, &custom_type.name)
                })
            })?;

        Ok(updated > 0)
    }

    async fn delete(
        &self,
        user_id: &UserId,
        id: &CustomTypeId,
    ) -> Result<bool, CustomTypeRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(CustomTypeRepositoryError::from_pool)?;

        // Entries keep their rows; the foreign key nulls `custom_type_id`.
        let deleted = diesel::delete(
            custom_coffee_types::table.filter(
                custom_coffee_types::id
                    .eq(id.as_uuid())
                    .and(custom_coffee_types::user_id.eq(user_id.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(CustomTypeRepositoryError::from_diesel)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn row(caffeine_mg: Option<i32>) -> CustomTypeRow {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single().expect("valid");
        CustomTypeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Cold foam".to_owned(),
            caffeine_mg,
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    #[case(Some(80), Some(80))]
    #[case(None, None)]
    fn rows_convert_to_custom_types(#[case] stored: Option<i32>, #[case] expected: Option<u32>) {
        let custom = row_to_custom_type(row(stored)).expect("valid row");

        assert_eq!(custom.caffeine_mg, expected);
        assert_eq!(custom.name, "Cold foam");
    }

    #[rstest]
    fn negative_caffeine_is_corrupt() {
        let error = row_to_custom_type(row(Some(-1))).expect_err("corrupt");

        assert!(matches!(error, CustomTypeRepositoryError::Query { .. }));
    }

    #[rstest]
    fn name_constraint_maps_to_duplicate_name() {
        let claimed = claim_duplicate_name(Some(NAME_CONSTRAINT), "Cold foam");
        let ignored = claim_duplicate_name(Some("custom_coffee_types_pkey"), "Cold foam");

        assert_eq!(
            claimed,
            Some(CustomTypeRepositoryError::duplicate_name("Cold foam"))
        );
        assert_eq!(ignored, None);
    }
}
