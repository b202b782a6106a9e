//! Contacts API entry-point: loads settings, prepares adapters and serves HTTP.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use contacts_api::inbound::http::health::HealthState;
use contacts_api::outbound::cache::RedisUserCache;
use contacts_api::outbound::mail::HttpConfirmationMailer;
use contacts_api::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use contacts_api::outbound::security::JwtCodec;
use contacts_api::server::{AppSettings, ServerConfig, create_server};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

async fn prepare_database(database_url: &str) -> Result<DbPool> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .wrap_err("migration task panicked")?
        .wrap_err("failed to apply database migrations")?;
    DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("failed to build database pool")
}

async fn build_server_config(settings: &AppSettings) -> Result<ServerConfig> {
    let tokens = JwtCodec::new(settings.jwt_settings()?, Arc::new(DefaultClock))?;
    let mut config = ServerConfig::new(settings.bind_addr()?, tokens)
        .with_cors_allowed_origin(settings.cors_allowed_origin());
    if let Some(base_url) = settings.public_base_url()? {
        config = config.with_public_base_url(base_url);
    }

    match settings.database_url()? {
        Some(url) => config = config.with_db_pool(prepare_database(url).await?),
        None => warn!("running with in-memory storage; data is lost on restart"),
    }

    if let Some(cache_settings) = settings.user_cache_settings()? {
        let cache = RedisUserCache::connect(cache_settings)
            .await
            .map_err(|err| eyre!("failed to configure user cache: {err}"))?;
        config = config.with_user_cache(cache);
        info!("redis user cache enabled");
    }

    match settings.mailer_settings()? {
        Some(mailer_settings) => {
            let mailer = HttpConfirmationMailer::new(mailer_settings)
                .map_err(|err| eyre!("failed to configure mailer: {err}"))?;
            config = config.with_mailer(mailer);
        }
        None => warn!("no mail API configured; confirmation links are logged"),
    }

    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let config = build_server_config(&settings).await?;
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "contacts API listening");
    server.await.wrap_err("server terminated with an error")
}
