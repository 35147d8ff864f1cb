//! Statistics service implementing [`StatsQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveTime};
use mockable::Clock;

use super::entries_service::map_entry_error;
use super::stats::{
    average_daily, contribution_grid, contribution_start, group_daily, most_common_type,
};
use crate::domain::ports::{EntryRepository, StatsQuery};
use crate::domain::{AggregatedStats, ContributionDay, DailyStats, DateRange, Error, UserId};

/// Statistics over an [`EntryRepository`], relative to an injected clock.
#[derive(Clone)]
pub struct StatsService<E> {
    entries: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<E> StatsService<E> {
    pub fn new(entries: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self { entries, clock }
    }
}

#[async_trait]
impl<E> StatsQuery for StatsService<E>
where
    E: EntryRepository,
{
    async fn daily(&self, user_id: &UserId, range: DateRange) -> Result<Vec<DailyStats>, Error> {
        let entries = self
            .entries
            .list_all(user_id, &range)
            .await
            .map_err(map_entry_error)?;
        Ok(group_daily(entries))
    }

    async fn aggregated(&self, user_id: &UserId) -> Result<AggregatedStats, Error> {
        let now = self.clock.utc();
        let today = DateRange::since(now.date_naive().and_time(NaiveTime::MIN).and_utc());
        let week = DateRange::since(now - Duration::days(7));
        let month = DateRange::since(now - Duration::days(30));

        let (daily, weekly, monthly, total_caffeine, types) = tokio::try_join!(
            self.entries.count(user_id, &today),
            self.entries.count(user_id, &week),
            self.entries.count(user_id, &month),
            self.entries.total_caffeine(user_id),
            self.entries.fixed_types_oldest_first(user_id),
        )
        .map_err(map_entry_error)?;

        Ok(AggregatedStats {
            daily,
            weekly,
            monthly,
            average_daily: average_daily(monthly),
            total_caffeine,
            most_common_type: most_common_type(types),
        })
    }

    async fn contribution(&self, user_id: &UserId) -> Result<Vec<ContributionDay>, Error> {
        let today = self.clock.utc().date_naive();
        let since = contribution_start(today).and_time(NaiveTime::MIN).and_utc();
        let consumed = self
            .entries
            .consumed_since(user_id, since)
            .await
            .map_err(map_entry_error)?;
        Ok(contribution_grid(today, consumed))
    }
}
