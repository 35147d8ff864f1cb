//! Entry domain service implementing the entry command and query ports.
//!
//! The service owns caffeine derivation and ownership checks on the custom
//! type and companions an entry references; repositories only store rows.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::companions_service::map_companion_error;
use super::custom_types_service::map_custom_type_error;
use crate::domain::ports::{
    CompanionRepository, CustomTypeRepository, EntriesCommand, EntriesQuery, EntryRepository,
    EntryRepositoryError, EntryWrite,
};
use crate::domain::{
    CoffeeEntry, CoffeeSize, CompanionId, CustomCoffeeType, CustomTypeId, DateRange, DrinkSource,
    EntryChanges, EntryId, EntryPage, EntryRecord, Error, NewEntry, PageRequest, UserId,
    calculate_caffeine, calculate_custom_caffeine,
};

/// Entry service over the entry, custom type and companion repositories.
#[derive(Clone)]
pub struct EntriesService<E, T, C> {
    entries: Arc<E>,
    custom_types: Arc<T>,
    companions: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<E, T, C> EntriesService<E, T, C> {
    /// Create a service from its repositories.
    pub fn new(
        entries: Arc<E>,
        custom_types: Arc<T>,
        companions: Arc<C>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries,
            custom_types,
            companions,
            clock,
        }
    }
}

pub(crate) fn map_entry_error(error: EntryRepositoryError) -> Error {
    match error {
        EntryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("entry repository unavailable: {message}"))
        }
        EntryRepositoryError::Query { message } => {
            Error::internal(format!("entry repository error: {message}"))
        }
    }
}

fn entry_not_found() -> Error {
    Error::not_found("Entry not found")
}

impl<E, T, C> EntriesService<E, T, C>
where
    E: EntryRepository,
    T: CustomTypeRepository,
    C: CompanionRepository,
{
    async fn owned_custom_type(
        &self,
        user_id: &UserId,
        id: &CustomTypeId,
    ) -> Result<CustomCoffeeType, Error> {
        self.custom_types
            .find(user_id, id)
            .await
            .map_err(map_custom_type_error)?
            .ok_or_else(|| Error::not_found("Custom type not found"))
    }

    async fn ensure_companions_owned(
        &self,
        user_id: &UserId,
        ids: &[CompanionId],
    ) -> Result<(), Error> {
        if ids.is_empty() {
            return Ok(());
        }
        let found = self
            .companions
            .find_many(user_id, ids)
            .await
            .map_err(map_companion_error)?;
        if found.len() != ids.len() {
            return Err(Error::not_found("Companion not found"));
        }
        Ok(())
    }

    async fn caffeine_for(
        &self,
        user_id: &UserId,
        source: DrinkSource,
        size: CoffeeSize,
    ) -> Result<u32, Error> {
        match source {
            DrinkSource::Fixed(coffee_type) => Ok(calculate_caffeine(coffee_type, size)),
            DrinkSource::Custom(id) => {
                let custom = self.owned_custom_type(user_id, &id).await?;
                Ok(calculate_custom_caffeine(custom.caffeine_mg, size))
            }
        }
    }
}

#[async_trait]
impl<E, T, C> EntriesCommand for EntriesService<E, T, C>
where
    E: EntryRepository,
    T: CustomTypeRepository,
    C: CompanionRepository,
{
    async fn create(&self, user_id: &UserId, entry: NewEntry) -> Result<CoffeeEntry, Error> {
        let caffeine_mg = self.caffeine_for(user_id, entry.source, entry.size).await?;
        self.ensure_companions_owned(user_id, &entry.companion_ids)
            .await?;

        let (coffee_type, custom_type_id) = match entry.source {
            DrinkSource::Fixed(coffee_type) => (Some(coffee_type), None),
            DrinkSource::Custom(id) => (None, Some(id)),
        };
        let now = self.clock.utc();
        let record = EntryRecord {
            id: EntryId::random(),
            user_id: *user_id,
            coffee_type,
            custom_type_id,
            size: entry.size,
            caffeine_mg,
            consumed_at: entry.consumed_at.unwrap_or(now),
            notes: entry.notes,
            created_at: now,
            updated_at: now,
        };
        self.entries
            .insert(&EntryWrite {
                record,
                companion_ids: Some(entry.companion_ids),
            })
            .await
            .map_err(map_entry_error)
    }

    async fn update(
        &self,
        user_id: &UserId,
        entry_id: &EntryId,
        changes: EntryChanges,
    ) -> Result<CoffeeEntry, Error> {
        let existing = self
            .entries
            .find(user_id, entry_id)
            .await
            .map_err(map_entry_error)?
            .ok_or_else(entry_not_found)?;
        let mut record = existing.to_record();

        let (coffee_type, custom_type_id) =
            changes.resolve_source(record.coffee_type, record.custom_type_id);
        let size = changes.size.unwrap_or(record.size);
        if changes.affects_caffeine() {
            record.caffeine_mg = match DrinkSource::from_parts(coffee_type, custom_type_id) {
                Ok(source) => self.caffeine_for(user_id, source, size).await?,
                // Source lost to a custom type delete; price it as OTHER.
                Err(_) if !changes.addresses_source() => calculate_custom_caffeine(None, size),
                Err(issue) => return Err(Error::validation(vec![issue])),
            };
        }
        if let Some(ids) = changes.companion_ids.as_deref() {
            self.ensure_companions_owned(user_id, ids).await?;
        }

        record.coffee_type = coffee_type;
        record.custom_type_id = custom_type_id;
        record.size = size;
        if let Some(consumed_at) = changes.consumed_at {
            record.consumed_at = consumed_at;
        }
        record.notes = changes.notes.apply(record.notes);
        record.updated_at = self.clock.utc();

        self.entries
            .update(&EntryWrite {
                record,
                companion_ids: changes.companion_ids,
            })
            .await
            .map_err(map_entry_error)?
            .ok_or_else(entry_not_found)
    }

    async fn delete(&self, user_id: &UserId, entry_id: &EntryId) -> Result<(), Error> {
        let deleted = self
            .entries
            .delete(user_id, entry_id)
            .await
            .map_err(map_entry_error)?;
        if deleted { Ok(()) } else { Err(entry_not_found()) }
    }
}

#[async_trait]
impl<E, T, C> EntriesQuery for EntriesService<E, T, C>
where
    E: EntryRepository,
    T: CustomTypeRepository,
    C: CompanionRepository,
{
    async fn list(
        &self,
        user_id: &UserId,
        range: DateRange,
        page: PageRequest,
    ) -> Result<EntryPage, Error> {
        let (entries, total) = self
            .entries
            .list_page(user_id, &range, &page)
            .await
            .map_err(map_entry_error)?;
        Ok(EntryPage {
            entries,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    async fn get(&self, user_id: &UserId, entry_id: &EntryId) -> Result<CoffeeEntry, Error> {
        self.entries
            .find(user_id, entry_id)
            .await
            .map_err(map_entry_error)?
            .ok_or_else(entry_not_found)
    }
}

#[cfg(test)]
#[path = "entries_service_tests.rs"]
mod tests;
