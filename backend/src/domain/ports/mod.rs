//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`], [`TokenService`]) are
//! implemented by outbound adapters. Driving ports (`*Command`, `*Query`,
//! [`AuthService`]) are implemented by domain services and called by inbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_service;
mod companion_repository;
mod companions;
mod custom_type_repository;
mod custom_types;
mod entries_command;
mod entries_query;
mod entry_repository;
mod password_hasher;
mod stats_query;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use auth_service::MockAuthService;
pub use auth_service::AuthService;
#[cfg(test)]
pub use companion_repository::MockCompanionRepository;
pub use companion_repository::{CompanionRepository, CompanionRepositoryError};
#[cfg(test)]
pub use companions::{MockCompanionsCommand, MockCompanionsQuery};
pub use companions::{CompanionsCommand, CompanionsQuery};
#[cfg(test)]
pub use custom_type_repository::MockCustomTypeRepository;
pub use custom_type_repository::{CustomTypeRepository, CustomTypeRepositoryError};
#[cfg(test)]
pub use custom_types::{MockCustomTypesCommand, MockCustomTypesQuery};
pub use custom_types::{CustomTypesCommand, CustomTypesQuery};
#[cfg(test)]
pub use entries_command::MockEntriesCommand;
pub use entries_command::EntriesCommand;
#[cfg(test)]
pub use entries_query::MockEntriesQuery;
pub use entries_query::EntriesQuery;
#[cfg(test)]
pub use entry_repository::MockEntryRepository;
pub use entry_repository::{EntryRepository, EntryRepositoryError, EntryWrite};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use stats_query::MockStatsQuery;
pub use stats_query::StatsQuery;
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
