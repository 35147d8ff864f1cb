//! PostgreSQL-backed `EntryRepository` implementation.
//!
//! Entries are read as bare rows and then hydrated with their custom type and
//! companions in two follow-up queries, regardless of page size.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{EntryRepository, EntryRepositoryError, EntryWrite};
use crate::domain::{
    CoffeeEntry, CoffeeType, Companion, CustomCoffeeType, CustomTypeId, DateRange, EntryId,
    EntryRecord, PageRequest, RangeEnd, UserId,
};

use super::diesel_companion_repository::row_to_companion;
use super::diesel_custom_type_repository::row_to_custom_type;
use super::diesel_helpers::{
    RepositoryFailure, collect_rows, non_negative, to_column, to_total,
};
use super::models::{CompanionRow, CustomTypeRow, EntryCompanionRow, EntryRow, EntryUpdate};
use super::pool::DbPool;
use super::schema::{coffee_entries, companions, custom_coffee_types, entry_companions};

/// Diesel-backed implementation of the [`EntryRepository`] port.
#[derive(Clone)]
pub struct DieselEntryRepository {
    pool: DbPool,
}

impl DieselEntryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: EntryRow) -> Result<EntryRecord, EntryRepositoryError> {
    let coffee_type = row
        .coffee_type
        .as_deref()
        .map(str::parse::<CoffeeType>)
        .transpose()
        .map_err(|err| EntryRepositoryError::query(format!("entry {}: {err}", row.id)))?;
    let size = row
        .size
        .parse()
        .map_err(|err| EntryRepositoryError::query(format!("entry {}: {err}", row.id)))?;
    Ok(EntryRecord {
        id: EntryId::from(row.id),
        user_id: UserId::from(row.user_id),
        coffee_type,
        custom_type_id: row.custom_type_id.map(CustomTypeId::from),
        size,
        caffeine_mg: non_negative(row.caffeine_mg, "caffeine_mg")?,
        consumed_at: row.consumed_at,
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn record_to_row(record: &EntryRecord) -> Result<EntryRow, EntryRepositoryError> {
    Ok(EntryRow {
        id: *record.id.as_uuid(),
        user_id: *record.user_id.as_uuid(),
        coffee_type: record.coffee_type.map(|t| t.as_str().to_owned()),
        custom_type_id: record.custom_type_id.map(Uuid::from),
        size: record.size.as_str().to_owned(),
        caffeine_mg: to_column(record.caffeine_mg, "caffeine_mg")?,
        notes: record.notes.clone(),
        consumed_at: record.consumed_at,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

fn companion_links(entry_id: Uuid, write: &EntryWrite) -> Option<Vec<EntryCompanionRow>> {
    write.companion_ids.as_ref().map(|ids| {
        ids.iter()
            .map(|id| EntryCompanionRow {
                entry_id,
                companion_id: *id.as_uuid(),
            })
            .collect()
    })
}

/// Filter a user's entries to `range`.
fn scoped(user_id: &UserId, range: &DateRange) -> coffee_entries::BoxedQuery<'static, Pg> {
    let mut query = coffee_entries::table
        .filter(coffee_entries::user_id.eq(*user_id.as_uuid()))
        .into_boxed();
    if let Some(start) = range.start {
        query = query.filter(coffee_entries::consumed_at.ge(start));
    }
    match range.end {
        Some(RangeEnd::Through(end)) => {
            query = query.filter(coffee_entries::consumed_at.le(end));
        }
        Some(RangeEnd::Before(end)) => {
            query = query.filter(coffee_entries::consumed_at.lt(end));
        }
        None => {}
    }
    query
}

/// Resolve custom types and companions for a batch of rows, keeping order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<EntryRow>,
) -> Result<Vec<CoffeeEntry>, EntryRepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let entry_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let custom_ids: Vec<Uuid> = rows.iter().filter_map(|row| row.custom_type_id).collect();

    let custom_rows: Vec<CustomTypeRow> = if custom_ids.is_empty() {
        Vec::new()
    } else {
        custom_coffee_types::table
            .filter(custom_coffee_types::id.eq_any(&custom_ids))
            .select(CustomTypeRow::as_select())
            .load(conn)
            .await
            .map_err(EntryRepositoryError::from_diesel)?
    };
    let link_rows: Vec<(Uuid, CompanionRow)> = entry_companions::table
        .inner_join(companions::table)
        .filter(entry_companions::entry_id.eq_any(&entry_ids))
        .select((entry_companions::entry_id, CompanionRow::as_select()))
        .order_by(companions::name.asc())
        .load(conn)
        .await
        .map_err(EntryRepositoryError::from_diesel)?;

    let mut custom_types: HashMap<Uuid, CustomCoffeeType> = HashMap::new();
    for row in custom_rows {
        let custom = row_to_custom_type(row)
            .map_err(|err| EntryRepositoryError::query(err.to_string()))?;
        custom_types.insert(*custom.id.as_uuid(), custom);
    }
    let mut companions_by_entry: HashMap<Uuid, Vec<Companion>> = HashMap::new();
    for (entry_id, row) in link_rows {
        companions_by_entry
            .entry(entry_id)
            .or_default()
            .push(row_to_companion(row));
    }

    collect_rows(rows.into_iter().map(|row| {
        let custom = row
            .custom_type_id
            .and_then(|id| custom_types.get(&id).cloned());
        let companions = companions_by_entry.remove(&row.id).unwrap_or_default();
        row_to_record(row).map(|record| CoffeeEntry::from_record(record, custom, companions))
    }))
}

async fn load_one(
    conn: &mut AsyncPgConnection,
    user_id: &UserId,
    id: &EntryId,
) -> Result<Option<CoffeeEntry>, EntryRepositoryError> {
    let row: Option<EntryRow> = coffee_entries::table
        .filter(
            coffee_entries::id
                .eq(id.as_uuid())
                .and(coffee_entries::user_id.eq(user_id.as_uuid())),
        )
        .select(EntryRow::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(EntryRepositoryError::from_diesel)?;
    match row {
        Some(row) => Ok(hydrate(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

#[async_trait]
impl EntryRepository for DieselEntryRepository {
    async fn insert(&self, write: &EntryWrite) -> Result<CoffeeEntry, EntryRepositoryError> {
        let row = record_to_row(&write.record)?;
        let links = companion_links(row.id, write).unwrap_or_default();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(EntryRepositoryError::from_pool)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(coffee_entries::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                if !links.is_empty() {
                    diesel::insert_into(entry_companions::table)
                        .values(&links)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(EntryRepositoryError::from_diesel)?;

        let record = &write.record;
        load_one(&mut conn, &record.user_id, &record.id)
            .await?
            .ok_or_else(|| EntryRepositoryError::query("inserted entry could not be read back"))
    }

    async fn find(
        &self,
        user_id: &UserId,
        id: &EntryId,
    ) -> Result<Option<CoffeeEntry>, EntryRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(EntryRepositoryError::from_pool)?;
        load_one(&mut conn, user_id, id).await
    }

    async fn list_page(
        &self,
        user_id: &UserId,
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<(Vec<CoffeeEntry>, u64), EntryRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(EntryRepositoryError::from_pool)?;

        let total: i64 = scoped(user_id, range)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(EntryRepositoryError::from_diesel)?;
        let rows: Vec<EntryRow> = scoped(user_id, range)
            .select(EntryRow::as_select())
            .order_by((
                coffee_entries::consumed_at.desc(),
                coffee_entries::created_at.desc(),
            ))
            .limit(i64::from(page.limit))
            .offset(i64::try_from(page.offset).unwrap_or(i64::MAX))
            .load(&mut conn)
            .await
            .map_err(EntryRepositoryError::from_diesel)?;

        let entries = hydrate(&mut conn, rows).await?;
        Ok((entries, to_total(total)))
    }

    async fn list_all(
        &self,
        user_id: &UserId,
        range: &DateRange,
    ) -> Result<Vec<CoffeeEntry>, EntryRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(EntryRepositoryError::from_pool)?;
        let rows: Vec<EntryRow> = scoped(user_id, range)
            .select(EntryRow::as_select())
            .order_by((
                coffee_entries::consumed_at.desc(),
                coffee_entries::created_at.desc(),
            ))
            .load(&mut conn)
            .await
            .map_err(EntryRepositoryError::from_diesel)?;
        hydrate(&mut conn, rows).await
    }

    async fn update(
        &self,
        write: &EntryWrite,
    ) -> Result<Option<CoffeeEntry>, EntryRepositoryError> {
        let record = &write.record;
        let changeset = EntryUpdate {
            coffee_type: record.coffee_type.map(CoffeeType::as_str),
            custom_type_id: record.custom_type_id.map(Uuid::from),
            size: record.size.as_str(),
            caffeine_mg: to_column(record.caffeine_mg, "caffeine_mg")?,
            notes: record.notes.as_deref(),
            consumed_at: record.consumed_at,
            updated_at: record.updated_at,
        };
        let entry_id = *record.id.as_uuid();
        let owner_id = *record.user_id.as_uuid();
        let links = companion_links(entry_id, write);
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(EntryRepositoryError::from_pool)?;

        let updated = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(coffee_entries::table)
                        .filter(
                            coffee_entries::id
                                .eq(entry_id)
                                .and(coffee_entries::user_id.eq(owner_id)),
                        )
                        .set(&changeset)
                        .execute(conn)
                        .await?;
                    if updated == 0 {
                        return Ok(false);
                    }
                    if let Some(links) = links {
                        diesel::delete(
                            entry_companions::table
                                .filter(entry_companions::entry_id.eq(entry_id)),
                        )
                        .execute(conn)
                        .await?;
                        if !links.is_empty() {
                            diesel::insert_into(entry_companions::table)
                                .values(&links)
                                .execute(conn)
                                .await?;
                        }
                    }
                    Ok(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(EntryRepositoryError::from_diesel)?;

        if !updated {
            return Ok(None);
        }
        load_one(&mut conn, &record.user_id, &record.id).await
    }

    async fn delete(&self, user_id: &UserId, id: &EntryId) -> Result<bool, EntryRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(EntryRepositoryError::from_pool)?;

        let deleted = diesel::delete(
            coffee_entries::table.filter(
                coffee_entries::id
                    .eq(id.as_uuid())
                    .and(coffee_entries::user_id.eq(user_id.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(EntryRepositoryError::from_diesel)?;

        Ok(deleted > 0)
    }

    async fn count(
        &self,
        user_id: &UserId,
        range: &DateRange,
    ) -> Result<u64, EntryRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(EntryRepositoryError::from_pool)?;
        let total: i64 = scoped(user_id, range)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(EntryRepositoryError::from_diesel)?;
        Ok(to_total(total))
    }

    async fn total_caffeine(&self, user_id: &UserId) -> Result<u64, EntryRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(EntryRepositoryError::from_pool)?;
        let total: Option<i64> = coffee_entries::table
            .filter(coffee_entries::user_id.eq(user_id.as_uuid()))
            .select(diesel::dsl::sum(coffee_entries::caffeine_mg))
            .get_result(&mut conn)
            .await
            .map_err(EntryRepositoryError::from_diesel)?;
        Ok(total.map(to_total).unwrap_or_default())
    }

    async fn fixed_types_oldest_first(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CoffeeType>, EntryRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(EntryRepositoryError::from_pool)?;
        let stored: Vec<Option<String>> = coffee_entries::table
            .filter(
                coffee_entries::user_id
                    .eq(user_id.as_uuid())
                    .and(coffee_entries::coffee_type.is_not_null()),
            )
            .select(coffee_entries::coffee_type)
            .order_by((
                coffee_entries::consumed_at.asc(),
                coffee_entries::created_at.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(EntryRepositoryError::from_diesel)?;

        collect_rows(stored.into_iter().flatten().map(|raw| {
            raw.parse::<CoffeeType>()
                .map_err(|err| EntryRepositoryError::query(err.to_string()))
        }))
    }

    async fn consumed_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, EntryRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(EntryRepositoryError::from_pool)?;
        coffee_entries::table
            .filter(
                coffee_entries::user_id
                    .eq(user_id.as_uuid())
                    .and(coffee_entries::consumed_at.ge(since)),
            )
            .select(coffee_entries::consumed_at)
            .order_by(coffee_entries::consumed_at.asc())
            .load(&mut conn)
            .await
            .map_err(EntryRepositoryError::from_diesel)
    }
}
