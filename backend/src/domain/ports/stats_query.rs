//! Driving port for consumption statistics.

use async_trait::async_trait;

use crate::domain::{AggregatedStats, ContributionDay, DailyStats, DateRange, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsQuery: Send + Sync {
    /// Entries in `range` grouped by UTC date, newest date first.
    async fn daily(&self, user_id: &UserId, range: DateRange) -> Result<Vec<DailyStats>, Error>;

    /// Rolling counts relative to the current time.
    async fn aggregated(&self, user_id: &UserId) -> Result<AggregatedStats, Error>;

    /// Contribution calendar ending today.
    async fn contribution(&self, user_id: &UserId) -> Result<Vec<ContributionDay>, Error>;
}
