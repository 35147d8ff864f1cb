//! Backend entry-point: loads settings, prepares storage and serves the REST
//! API with health probes and OpenAPI docs.

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use brewlog::inbound::http::health::HealthState;
use brewlog::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use brewlog::server::{SecretSource, ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let token_ttl = settings.token_ttl().map_err(std::io::Error::other)?;
    let (secret, source) = settings.jwt_secret().map_err(std::io::Error::other)?;
    if source == SecretSource::Ephemeral {
        warn!("using ephemeral token secret; tokens will not survive a restart (dev only)");
    }

    let mut config = ServerConfig::new(bind_addr, secret).with_token_ttl(token_ttl);
    match settings.database_url.as_deref() {
        Some(database_url) => {
            run_pending_migrations(database_url)
                .await
                .map_err(std::io::Error::other)?;
            let pool = DbPool::new(
                PoolConfig::new(database_url).with_max_size(settings.db_pool_size()),
            )
            .await
            .map_err(std::io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => {
            warn!("BREWLOG_DATABASE_URL not set; storing data in memory (dev only)");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "brewlog listening");
    server.await
}
