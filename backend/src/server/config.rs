//! Server settings loaded via OrthoConfig and the runtime server
//! configuration built from them.

use std::net::SocketAddr;

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::outbound::persistence::DbPool;
use crate::outbound::security::DEFAULT_TOKEN_TTL_SECS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_POOL_SIZE: u32 = 10;
const EPHEMERAL_SECRET_LEN: usize = 32;

/// Startup settings read from `BREWLOG_*` environment variables and CLI
/// flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BREWLOG")]
pub struct ServerSettings {
    /// Socket address to listen on, e.g. `127.0.0.1:3000`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub db_pool_size: Option<u32>,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// Token lifetime in seconds.
    pub token_ttl_secs: Option<i64>,
    /// Permit a random signing secret outside debug builds.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
}

/// Invalid or incomplete settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}")]
    InvalidBindAddr { value: String },
    #[error("token TTL must be positive, got {value}")]
    InvalidTokenTtl { value: i64 },
    #[error("BREWLOG_JWT_SECRET is required in release builds")]
    MissingJwtSecret,
}

/// Where the token signing secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Configured,
    Ephemeral,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        match self.token_ttl_secs {
            None => Ok(Duration::seconds(DEFAULT_TOKEN_TTL_SECS)),
            Some(value) if value > 0 => Ok(Duration::seconds(value)),
            Some(value) => Err(SettingsError::InvalidTokenTtl { value }),
        }
    }

    /// Resolve the token signing secret for the current build profile.
    pub fn jwt_secret(&self) -> Result<(Zeroizing<Vec<u8>>, SecretSource), SettingsError> {
        self.resolve_jwt_secret(cfg!(debug_assertions))
    }

    fn resolve_jwt_secret(
        &self,
        debug_build: bool,
    ) -> Result<(Zeroizing<Vec<u8>>, SecretSource), SettingsError> {
        match self.jwt_secret.as_deref().filter(|secret| !secret.is_empty()) {
            Some(secret) => Ok((
                Zeroizing::new(secret.as_bytes().to_vec()),
                SecretSource::Configured,
            )),
            None if debug_build || self.allow_ephemeral_secret => {
                let bytes: [u8; EPHEMERAL_SECRET_LEN] = rand::random();
                Ok((Zeroizing::new(bytes.to_vec()), SecretSource::Ephemeral))
            }
            None => Err(SettingsError::MissingJwtSecret),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: Duration,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, jwt_secret: Zeroizing<Vec<u8>>) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            jwt_secret,
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one, every repository port is served from process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
