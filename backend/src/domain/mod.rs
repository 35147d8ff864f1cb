//! Domain primitives, aggregates and services.
//!
//! Purpose: define the coffee tracking model (users, entries, custom types,
//! companions, statistics) independent of HTTP and storage. Services here
//! implement the driving ports in [`ports`] on top of the driven repository
//! ports.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`calculate_caffeine`] / [`calculate_custom_caffeine`]: caffeine table.
//! - Services: [`AuthenticationService`], [`EntriesService`],
//!   [`CustomTypesService`], [`CompanionsService`], [`StatsService`].

pub mod auth;
pub mod coffee;
pub mod companion;
pub mod custom_type;
pub mod entry;
pub mod error;
pub mod ids;
mod name;
pub mod patch;
pub mod ports;
pub mod stats;
pub mod trace_id;
pub mod user;

mod auth_service;
mod companions_service;
mod custom_types_service;
mod entries_service;
mod stats_service;

pub use self::auth::{
    AuthSession, AuthToken, LoginCredentials, LoginValidationError, PASSWORD_MAX, PASSWORD_MIN,
    Registration,
};
pub use self::auth_service::AuthenticationService;
pub use self::coffee::{
    CoffeeSize, CoffeeType, UnknownVariant, calculate_caffeine, calculate_custom_caffeine,
};
pub use self::companion::{COMPANION_NAME_MAX, Companion, CompanionName};
pub use self::companions_service::CompanionsService;
pub use self::custom_type::{
    CUSTOM_TYPE_CAFFEINE_MAX, CUSTOM_TYPE_NAME_MAX, CustomCoffeeType, CustomTypeChanges,
    CustomTypeDraft,
};
pub use self::custom_types_service::CustomTypesService;
pub use self::entries_service::EntriesService;
pub use self::entry::{
    CoffeeEntry, DateRange, DrinkSource, EntryChanges, EntryPage, EntryRecord, NOTES_MAX,
    NewEntry, PAGE_LIMIT_DEFAULT, PAGE_LIMIT_MAX, PageRequest, RangeEnd,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, FieldIssue};
pub use self::ids::{CompanionId, CustomTypeId, EntryId, InvalidId, UserId};
pub use self::patch::Patch;
pub use self::stats::{
    AggregatedStats, CONTRIBUTION_DAYS, ContributionDay, DailyStats, average_daily,
    contribution_level,
};
pub use self::stats_service::StatsService;
pub use self::trace_id::TraceId;
pub use self::user::{Email, PasswordHash, User, UserAccount, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use brewlog::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("Entry not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
