//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AuthService, CompanionsCommand, CompanionsQuery, CustomTypesCommand, CustomTypesQuery,
    EntriesCommand, EntriesQuery, StatsQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn AuthService>,
    pub entries: Arc<dyn EntriesCommand>,
    pub entries_query: Arc<dyn EntriesQuery>,
    pub custom_types: Arc<dyn CustomTypesCommand>,
    pub custom_types_query: Arc<dyn CustomTypesQuery>,
    pub companions: Arc<dyn CompanionsCommand>,
    pub companions_query: Arc<dyn CompanionsQuery>,
    pub stats: Arc<dyn StatsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthService>,
    pub entries: Arc<dyn EntriesCommand>,
    pub entries_query: Arc<dyn EntriesQuery>,
    pub custom_types: Arc<dyn CustomTypesCommand>,
    pub custom_types_query: Arc<dyn CustomTypesQuery>,
    pub companions: Arc<dyn CompanionsCommand>,
    pub companions_query: Arc<dyn CompanionsQuery>,
    pub stats: Arc<dyn StatsQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use brewlog::inbound::http::state::{HttpState, HttpStatePorts};
    /// use brewlog::server::memory_ports;
    ///
    /// let ports: HttpStatePorts = memory_ports(b"secret");
    /// let state = HttpState::new(ports);
    /// let _auth = state.auth.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            auth,
            entries,
            entries_query,
            custom_types,
            custom_types_query,
            companions,
            companions_query,
            stats,
        } = ports;
        Self {
            auth,
            entries,
            entries_query,
            custom_types,
            custom_types_query,
            companions,
            companions_query,
            stats,
        }
    }
}
