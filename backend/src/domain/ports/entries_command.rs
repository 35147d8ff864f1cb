//! Driving port for entry mutations.

use async_trait::async_trait;

use crate::domain::{CoffeeEntry, EntryChanges, EntryId, Error, NewEntry, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntriesCommand: Send + Sync {
    /// Log a new entry, deriving its caffeine.
    async fn create(&self, user_id: &UserId, entry: NewEntry) -> Result<CoffeeEntry, Error>;

    /// Apply a partial update to an owned entry.
    async fn update(
        &self,
        user_id: &UserId,
        entry_id: &EntryId,
        changes: EntryChanges,
    ) -> Result<CoffeeEntry, Error>;

    /// Delete an owned entry.
    async fn delete(&self, user_id: &UserId, entry_id: &EntryId) -> Result<(), Error>;
}
