//! Process-local repositories.
//!
//! [`InMemoryStore`] implements every repository port over a single locked
//! state so it can stand in for PostgreSQL when no database is configured.
//! It mirrors the relational rules the migrations enforce: unique names per
//! user, custom type deletion nulling entry references, and companion
//! deletion detaching from entries.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    CompanionRepository, CompanionRepositoryError, CustomTypeRepository,
    CustomTypeRepositoryError, EntryRepository, EntryRepositoryError, EntryWrite,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    CoffeeEntry, CoffeeType, Companion, CompanionId, CustomCoffeeType, CustomTypeId, DateRange,
    Email, EntryId, EntryRecord, PageRequest, User, UserAccount, UserId, Username,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Clone)]
struct StoredEntry {
    record: EntryRecord,
    companion_ids: Vec<CompanionId>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, UserAccount>,
    custom_types: HashMap<CustomTypeId, CustomCoffeeType>,
    companions: HashMap<CompanionId, Companion>,
    entries: HashMap<EntryId, StoredEntry>,
}

impl State {
    fn hydrate(&self, stored: &StoredEntry) -> CoffeeEntry {
        let custom_type = stored
            .record
            .custom_type_id
            .and_then(|id| self.custom_types.get(&id).cloned());
        let mut companions: Vec<Companion> = stored
            .companion_ids
            .iter()
            .filter_map(|id| self.companions.get(id).cloned())
            .collect();
        companions.sort_by(|a, b| a.name.cmp(&b.name));
        CoffeeEntry::from_record(stored.record.clone(), custom_type, companions)
    }

    /// A user's entries inside `range`, newest first.
    fn entries_for<'a>(
        &'a self,
        user_id: &'a UserId,
        range: &'a DateRange,
    ) -> impl Iterator<Item = &'a StoredEntry> + 'a {
        let mut matching: Vec<&StoredEntry> = self
            .entries
            .values()
            .filter(|stored| stored.record.user_id == *user_id)
            .filter(|stored| range.contains(stored.record.consumed_at))
            .collect();
        matching.sort_by(|a, b| {
            (b.record.consumed_at, b.record.created_at)
                .cmp(&(a.record.consumed_at, a.record.created_at))
        });
        matching.into_iter()
    }

    fn custom_name_taken(&self, candidate: &CustomCoffeeType) -> bool {
        self.custom_types.values().any(|row| {
            row.user_id == candidate.user_id && row.name == candidate.name && row.id != candidate.id
        })
    }

    fn companion_name_taken(&self, candidate: &Companion) -> bool {
        self.companions.values().any(|row| {
            row.user_id == candidate.user_id && row.name == candidate.name && row.id != candidate.id
        })
    }
}

/// Thread-safe in-memory implementation of the repository ports.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
    ) -> Result<RwLockReadGuard<'_, State>, E> {
        self.state.read().map_err(|_| poisoned(POISONED))
    }

    fn write<E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
    ) -> Result<RwLockWriteGuard<'_, State>, E> {
        self.state.write().map_err(|_| poisoned(POISONED))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.write(UserPersistenceError::query)?;
        let user = &account.user;
        if state.users.values().any(|a| a.user.email == user.email) {
            return Err(UserPersistenceError::duplicate_email());
        }
        if state.users.values().any(|a| a.user.username == user.username) {
            return Err(UserPersistenceError::duplicate_username());
        }
        state.users.insert(user.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.read(UserPersistenceError::query)?;
        Ok(state.users.get(id).map(|account| account.user.clone()))
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.read(UserPersistenceError::query)?;
        Ok(state
            .users
            .values()
            .find(|account| account.user.email.as_ref() == email)
            .cloned())
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, UserPersistenceError> {
        let state = self.read(UserPersistenceError::query)?;
        Ok(state.users.values().any(|account| account.user.email == *email))
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        let state = self.read(UserPersistenceError::query)?;
        Ok(state
            .users
            .values()
            .any(|account| account.user.username == *username))
    }
}

#[async_trait]
impl CustomTypeRepository for InMemoryStore {
    async fn insert(
        &self,
        custom_type: &CustomCoffeeType,
    ) -> Result<(), CustomTypeRepositoryError> {
        let mut state = self.write(CustomTypeRepositoryError::query)?;
        if state.custom_name_taken(custom_type) {
            return Err(CustomTypeRepositoryError::duplicate_name(
                custom_type.name.clone(),
            ));
        }
        state.custom_types.insert(custom_type.id, custom_type.clone());
        Ok(())
    }

    async fn list(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CustomCoffeeType>, CustomTypeRepositoryError> {
        let state = self.read(CustomTypeRepositoryError::query)?;
        let mut rows: Vec<CustomCoffeeType> = state
            .custom_types
            .values()
            .filter(|row| row.user_id == *user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find(
        &self,
        user_id: &UserId,
        id: &CustomTypeId,
    ) -> Result<Option<CustomCoffeeType>, CustomTypeRepositoryError> {
        let state = self.read(CustomTypeRepositoryError::query)?;
        Ok(state
            .custom_types
            .get(id)
            .filter(|row| row.user_id == *user_id)
            .cloned())
    }

    async fn update(
        &self,
        custom_type: &CustomCoffeeType,
    ) -> Result<bool, CustomTypeRepositoryError> {
        let mut state = self.write(CustomTypeRepositoryError::query)?;
        let owned = state
            .custom_types
            .get(&custom_type.id)
            .is_some_and(|row| row.user_id == custom_type.user_id);
        if !owned {
            return Ok(false);
        }
        if state.custom_name_taken(custom_type) {
            return Err(CustomTypeRepositoryError::duplicate_name(
                custom_type.name.clone(),
            ));
        }
        state.custom_types.insert(custom_type.id, custom_type.clone());
        Ok(true)
    }

    async fn delete(
        &self,
        user_id: &UserId,
        id: &CustomTypeId,
    ) -> Result<bool, CustomTypeRepositoryError> {
        let mut state = self.write(CustomTypeRepositoryError::query)?;
        if !state
            .custom_types
            .get(id)
            .is_some_and(|row| row.user_id == *user_id)
        {
            return Ok(false);
        }
        state.custom_types.remove(id);
        for stored in state.entries.values_mut() {
            if stored.record.custom_type_id == Some(*id) {
                stored.record.custom_type_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl CompanionRepository for InMemoryStore {
    async fn insert(&self, companion: &Companion) -> Result<(), CompanionRepositoryError> {
        let mut state = self.write(CompanionRepositoryError::query)?;
        if state.companion_name_taken(companion) {
            return Err(CompanionRepositoryError::duplicate_name(
                companion.name.clone(),
            ));
        }
        state.companions.insert(companion.id, companion.clone());
        Ok(())
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<Companion>, CompanionRepositoryError> {
        let state = self.read(CompanionRepositoryError::query)?;
        let mut rows: Vec<Companion> = state
            .companions
            .values()
            .filter(|row| row.user_id == *user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find(
        &self,
        user_id: &UserId,
        id: &CompanionId,
    ) -> Result<Option<Companion>, CompanionRepositoryError> {
        let state = self.read(CompanionRepositoryError::query)?;
        Ok(state
            .companions
            .get(id)
            .filter(|row| row.user_id == *user_id)
            .cloned())
    }

    async fn find_many(
        &self,
        user_id: &UserId,
        ids: &[CompanionId],
    ) -> Result<Vec<Companion>, CompanionRepositoryError> {
        let state = self.read(CompanionRepositoryError::query)?;
        let mut rows: Vec<Companion> = ids
            .iter()
            .filter_map(|id| state.companions.get(id))
            .filter(|row| row.user_id == *user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows.dedup_by_key(|row| row.id);
        Ok(rows)
    }

    async fn update(&self, companion: &Companion) -> Result<bool, CompanionRepositoryError> {
        let mut state = self.write(CompanionRepositoryError::query)?;
        let owned = state
            .companions
            .get(&companion.id)
            .is_some_and(|row| row.user_id == companion.user_id);
        if !owned {
            return Ok(false);
        }
        if state.companion_name_taken(companion) {
            return Err(CompanionRepositoryError::duplicate_name(
                companion.name.clone(),
            ));
        }
        state.companions.insert(companion.id, companion.clone());
        Ok(true)
    }

    async fn delete(
        &self,
        user_id: &UserId,
        id: &CompanionId,
    ) -> Result<bool, CompanionRepositoryError> {
        let mut state = self.write(CompanionRepositoryError::query)?;
        if !state
            .companions
            .get(id)
            .is_some_and(|row| row.user_id == *user_id)
        {
            return Ok(false);
        }
        state.companions.remove(id);
        for stored in state.entries.values_mut() {
            stored.companion_ids.retain(|companion| companion != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl EntryRepository for InMemoryStore {
    async fn insert(&self, write: &EntryWrite) -> Result<CoffeeEntry, EntryRepositoryError> {
        let mut state = self.write(EntryRepositoryError::query)?;
        let stored = StoredEntry {
            record: write.record.clone(),
            companion_ids: write.companion_ids.clone().unwrap_or_default(),
        };
        let entry = state.hydrate(&stored);
        state.entries.insert(stored.record.id, stored);
        Ok(entry)
    }

    async fn find(
        &self,
        user_id: &UserId,
        id: &EntryId,
    ) -> Result<Option<CoffeeEntry>, EntryRepositoryError> {
        let state = self.read(EntryRepositoryError::query)?;
        Ok(state
            .entries
            .get(id)
            .filter(|stored| stored.record.user_id == *user_id)
            .map(|stored| state.hydrate(stored)))
    }

    async fn list_page(
        &self,
        user_id: &UserId,
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<(Vec<CoffeeEntry>, u64), EntryRepositoryError> {
        let state = self.read(EntryRepositoryError::query)?;
        let matching: Vec<&StoredEntry> = state.entries_for(user_id, range).collect();
        let total = matching.len() as u64;
        let entries = matching
            .into_iter()
            .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .map(|stored| state.hydrate(stored))
            .collect();
        Ok((entries, total))
    }

    async fn list_all(
        &self,
        user_id: &UserId,
        range: &DateRange,
    ) -> Result<Vec<CoffeeEntry>, EntryRepositoryError> {
        let state = self.read(EntryRepositoryError::query)?;
        Ok(state
            .entries_for(user_id, range)
            .map(|stored| state.hydrate(stored))
            .collect())
    }

    async fn update(
        &self,
        write: &EntryWrite,
    ) -> Result<Option<CoffeeEntry>, EntryRepositoryError> {
        let mut state = self.write(EntryRepositoryError::query)?;
        let record = &write.record;
        let Some(current) = state
            .entries
            .get(&record.id)
            .filter(|stored| stored.record.user_id == record.user_id)
        else {
            return Ok(None);
        };
        let stored = StoredEntry {
            record: record.clone(),
            companion_ids: write
                .companion_ids
                .clone()
                .unwrap_or_else(|| current.companion_ids.clone()),
        };
        let entry = state.hydrate(&stored);
        state.entries.insert(record.id, stored);
        Ok(Some(entry))
    }

    async fn delete(&self, user_id: &UserId, id: &EntryId) -> Result<bool, EntryRepositoryError> {
        let mut state = self.write(EntryRepositoryError::query)?;
        let owned = state
            .entries
            .get(id)
            .is_some_and(|stored| stored.record.user_id == *user_id);
        if owned {
            state.entries.remove(id);
        }
        Ok(owned)
    }

    async fn count(
        &self,
        user_id: &UserId,
        range: &DateRange,
    ) -> Result<u64, EntryRepositoryError> {
        let state = self.read(EntryRepositoryError::query)?;
        Ok(state.entries_for(user_id, range).count() as u64)
    }

    async fn total_caffeine(&self, user_id: &UserId) -> Result<u64, EntryRepositoryError> {
        let state = self.read(EntryRepositoryError::query)?;
        Ok(state
            .entries_for(user_id, &DateRange::default())
            .map(|stored| u64::from(stored.record.caffeine_mg))
            .sum())
    }

    async fn fixed_types_oldest_first(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CoffeeType>, EntryRepositoryError> {
        let state = self.read(EntryRepositoryError::query)?;
        let mut types: Vec<CoffeeType> = state
            .entries_for(user_id, &DateRange::default())
            .filter_map(|stored| stored.record.coffee_type)
            .collect();
        types.reverse();
        Ok(types)
    }

    async fn consumed_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, EntryRepositoryError> {
        let state = self.read(EntryRepositoryError::query)?;
        let mut consumed: Vec<DateTime<Utc>> = state
            .entries_for(user_id, &DateRange::since(since))
            .map(|stored| stored.record.consumed_at)
            .collect();
        consumed.reverse();
        Ok(consumed)
    }
}
