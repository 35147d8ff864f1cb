//! Driving port for entry reads.

use async_trait::async_trait;

use crate::domain::{CoffeeEntry, DateRange, EntryId, EntryPage, Error, PageRequest, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntriesQuery: Send + Sync {
    /// Page through owned entries, newest first.
    async fn list(
        &self,
        user_id: &UserId,
        range: DateRange,
        page: PageRequest,
    ) -> Result<EntryPage, Error>;

    /// Fetch one owned entry.
    async fn get(&self, user_id: &UserId, entry_id: &EntryId) -> Result<CoffeeEntry, Error>;
}
