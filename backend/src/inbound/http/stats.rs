//! Statistics handlers.
//!
//! ```text
//! GET /api/stats/daily?startDate=2024-03-01&endDate=2024-03-31
//! GET /api/stats/aggregated
//! GET /api/stats/contribution
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{AggregatedStats, CoffeeType, ContributionDay, DailyStats};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::entries::EntryResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{Issues, parse_date_range};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Optional window for the daily breakdown.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StatsRangeQuery {
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`; a bare date covers the whole day.
    pub end_date: Option<String>,
}

/// Entries logged on one UTC day.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatsResponse {
    #[schema(format = "date", example = "2024-03-15")]
    pub date: String,
    pub count: u32,
    pub total_caffeine: u64,
    pub entries: Vec<EntryResponse>,
}

impl From<DailyStats> for DailyStatsResponse {
    fn from(value: DailyStats) -> Self {
        Self {
            date: value.date.format(DATE_FORMAT).to_string(),
            count: value.count,
            total_caffeine: value.total_caffeine,
            entries: value.entries.into_iter().map(EntryResponse::from).collect(),
        }
    }
}

/// Rolling counts relative to the current time.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStatsResponse {
    /// Entries since midnight UTC.
    pub daily: u64,
    /// Entries in the last 7 days.
    pub weekly: u64,
    /// Entries in the last 30 days.
    pub monthly: u64,
    #[schema(example = 0.5)]
    pub average_daily: f64,
    pub total_caffeine: u64,
    /// Omitted when no entry uses a built-in type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_type: Option<CoffeeType>,
}

impl From<AggregatedStats> for AggregatedStatsResponse {
    fn from(value: AggregatedStats) -> Self {
        Self {
            daily: value.daily,
            weekly: value.weekly,
            monthly: value.monthly,
            average_daily: value.average_daily,
            total_caffeine: value.total_caffeine,
            most_common_type: value.most_common_type,
        }
    }
}

/// One cell of the activity grid.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContributionDayResponse {
    #[schema(format = "date", example = "2024-03-15")]
    pub date: String,
    pub count: u32,
    /// Intensity bucket from 0 to 4.
    #[schema(minimum = 0, maximum = 4)]
    pub level: u8,
}

impl From<ContributionDay> for ContributionDayResponse {
    fn from(value: ContributionDay) -> Self {
        Self {
            date: value.date.format(DATE_FORMAT).to_string(),
            count: value.count,
            level: value.level,
        }
    }
}

/// Entries grouped by day, newest day first.
#[utoipa::path(
    get,
    path = "/api/stats/daily",
    params(StatsRangeQuery),
    responses(
        (status = 200, description = "Daily groups", body = [DailyStatsResponse]),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["stats"],
    operation_id = "dailyStats",
    security(("BearerAuth" = []))
)]
#[get("/stats/daily")]
pub async fn daily_stats(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<StatsRangeQuery>,
) -> ApiResult<web::Json<Vec<DailyStatsResponse>>> {
    let mut issues = Issues::default();
    let range = parse_date_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        &mut issues,
    );
    issues.finish()?;

    let days = state.stats.daily(user.user_id(), range).await?;
    Ok(web::Json(
        days.into_iter().map(DailyStatsResponse::from).collect(),
    ))
}

/// Today, week and month counts with averages.
#[utoipa::path(
    get,
    path = "/api/stats/aggregated",
    responses(
        (status = 200, description = "Aggregated statistics", body = AggregatedStatsResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["stats"],
    operation_id = "aggregatedStats",
    security(("BearerAuth" = []))
)]
#[get("/stats/aggregated")]
pub async fn aggregated_stats(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<AggregatedStatsResponse>> {
    let stats = state.stats.aggregated(user.user_id()).await?;
    Ok(web::Json(AggregatedStatsResponse::from(stats)))
}

/// Per-day counts for the trailing 365 days, oldest first.
#[utoipa::path(
    get,
    path = "/api/stats/contribution",
    responses(
        (status = 200, description = "Contribution grid", body = [ContributionDayResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["stats"],
    operation_id = "contributionStats",
    security(("BearerAuth" = []))
)]
#[get("/stats/contribution")]
pub async fn contribution_stats(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ContributionDayResponse>>> {
    let grid = state.stats.contribution(user.user_id()).await?;
    Ok(web::Json(
        grid.into_iter().map(ContributionDayResponse::from).collect(),
    ))
}
