//! Port for coffee entry persistence and the aggregate reads behind
//! statistics.
//!
//! Every method is scoped by the owning user. Adapters resolve the custom type
//! and companions of each entry they return.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CoffeeEntry, CoffeeType, CompanionId, DateRange, EntryId, EntryRecord, PageRequest, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by entry repository adapters.
    pub enum EntryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "entry repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "entry repository query failed: {message}",
    }
}

/// Full write of an entry row plus, optionally, its companion set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryWrite {
    pub record: EntryRecord,
    /// `None` keeps the existing associations on update.
    pub companion_ids: Option<Vec<CompanionId>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Insert a new entry and its companion links.
    async fn insert(&self, write: &EntryWrite) -> Result<CoffeeEntry, EntryRepositoryError>;

    /// Fetch one entry owned by `user_id`.
    async fn find(
        &self,
        user_id: &UserId,
        id: &EntryId,
    ) -> Result<Option<CoffeeEntry>, EntryRepositoryError>;

    /// One page of entries in `range`, newest first, with the total match
    /// count.
    async fn list_page(
        &self,
        user_id: &UserId,
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<(Vec<CoffeeEntry>, u64), EntryRepositoryError>;

    /// Every entry in `range`, newest first.
    async fn list_all(
        &self,
        user_id: &UserId,
        range: &DateRange,
    ) -> Result<Vec<CoffeeEntry>, EntryRepositoryError>;

    /// Overwrite an entry's row and, when supplied, replace its companion
    /// links atomically. Returns `None` when no owned entry matches.
    async fn update(&self, write: &EntryWrite)
    -> Result<Option<CoffeeEntry>, EntryRepositoryError>;

    /// Delete an owned entry; `false` when nothing matched.
    async fn delete(&self, user_id: &UserId, id: &EntryId) -> Result<bool, EntryRepositoryError>;

    /// Number of entries consumed within `range`.
    async fn count(&self, user_id: &UserId, range: &DateRange)
    -> Result<u64, EntryRepositoryError>;

    /// Sum of caffeine over every entry.
    async fn total_caffeine(&self, user_id: &UserId) -> Result<u64, EntryRepositoryError>;

    /// Fixed coffee types of all entries, ordered oldest `consumed_at` first.
    /// Entries with a custom type are skipped.
    async fn fixed_types_oldest_first(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CoffeeType>, EntryRepositoryError>;

    /// Consumption timestamps at or after `since`.
    async fn consumed_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, EntryRepositoryError>;
}
