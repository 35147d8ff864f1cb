//! Builders wiring repositories, services and credential adapters into the
//! HTTP state.

use std::sync::Arc;

use actix_web::web;
use chrono::Duration;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    CompanionRepository, CustomTypeRepository, EntryRepository, UserRepository,
};
use crate::domain::{
    AuthenticationService, CompanionsService, CustomTypesService, EntriesService, StatsService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselCompanionRepository, DieselCustomTypeRepository, DieselEntryRepository,
    DieselUserRepository,
};
use crate::outbound::security::{BcryptPasswordHasher, DEFAULT_TOKEN_TTL_SECS, JwtTokenService};

use super::ServerConfig;

/// Repository adapters backing one service graph.
struct Repositories<U, T, C, E> {
    users: Arc<U>,
    custom_types: Arc<T>,
    companions: Arc<C>,
    entries: Arc<E>,
}

fn build_ports<U, T, C, E>(
    repos: Repositories<U, T, C, E>,
    tokens: JwtTokenService,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    T: CustomTypeRepository + 'static,
    C: CompanionRepository + 'static,
    E: EntryRepository + 'static,
{
    let Repositories {
        users,
        custom_types,
        companions,
        entries,
    } = repos;

    let auth = AuthenticationService::new(
        users,
        Arc::new(BcryptPasswordHasher::default()),
        Arc::new(tokens),
        clock.clone(),
    );
    let entries_service = Arc::new(EntriesService::new(
        entries.clone(),
        custom_types.clone(),
        companions.clone(),
        clock.clone(),
    ));
    let custom_types_service = Arc::new(CustomTypesService::new(custom_types, clock.clone()));
    let companions_service = Arc::new(CompanionsService::new(companions, clock.clone()));
    let stats = StatsService::new(entries, clock);

    HttpStatePorts {
        auth: Arc::new(auth),
        entries: entries_service.clone(),
        entries_query: entries_service,
        custom_types: custom_types_service.clone(),
        custom_types_query: custom_types_service,
        companions: companions_service.clone(),
        companions_query: companions_service,
        stats: Arc::new(stats),
    }
}

/// Ports backed by PostgreSQL repositories sharing `pool`.
pub fn diesel_ports(pool: &DbPool, secret: &[u8], token_ttl: Duration) -> HttpStatePorts {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    build_ports(
        Repositories {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            custom_types: Arc::new(DieselCustomTypeRepository::new(pool.clone())),
            companions: Arc::new(DieselCompanionRepository::new(pool.clone())),
            entries: Arc::new(DieselEntryRepository::new(pool.clone())),
        },
        JwtTokenService::new(secret, token_ttl, clock.clone()),
        clock,
    )
}

/// Ports backed by a fresh [`InMemoryStore`], for development and
/// integration tests.
///
/// ```
/// use brewlog::server::memory_ports;
///
/// let ports = memory_ports(b"development-secret");
/// # let _ = ports;
/// ```
pub fn memory_ports(secret: &[u8]) -> HttpStatePorts {
    memory_ports_with_ttl(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
}

fn memory_ports_with_ttl(secret: &[u8], token_ttl: Duration) -> HttpStatePorts {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store = Arc::new(InMemoryStore::new());
    build_ports(
        Repositories {
            users: store.clone(),
            custom_types: store.clone(),
            companions: store.clone(),
            entries: store,
        },
        JwtTokenService::new(secret, token_ttl, clock.clone()),
        clock,
    )
}

/// Build HTTP state from the configured pool, falling back to memory.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = match &config.db_pool {
        Some(pool) => diesel_ports(pool, &config.jwt_secret, config.token_ttl),
        None => memory_ports_with_ttl(&config.jwt_secret, config.token_ttl),
    };
    web::Data::new(HttpState::new(ports))
}
