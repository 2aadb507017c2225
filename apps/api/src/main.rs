mod catalog;
mod config;
mod db;
mod errors;
mod models;
mod recommendation;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::{JobCatalog, PgJobCatalog, PortalApiCatalog};
use crate::config::{CatalogBackend, Config};
use crate::db::create_pool;
use crate::recommendation::store::{InMemorySettingsStore, RedisSettingsStore, SettingsStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Portal API v{}", env!("CARGO_PKG_VERSION"));

    let catalog = build_catalog(&config).await?;
    let settings_store = build_settings_store(&config)?;

    let state = AppState {
        catalog,
        settings_store,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the portal's web origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects the configured job catalog backend.
async fn build_catalog(config: &Config) -> Result<Arc<dyn JobCatalog>> {
    match &config.catalog {
        CatalogBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = create_pool(database_url, *max_connections).await?;
            info!("Job catalog: postgres");
            Ok(Arc::new(PgJobCatalog::new(pool)))
        }
        CatalogBackend::PortalApi { base_url, token } => {
            let catalog = PortalApiCatalog::new(base_url, token.clone())
                .context("Failed to build portal API client")?;
            info!("Job catalog: portal API at {base_url}");
            Ok(Arc::new(catalog))
        }
    }
}

/// Redis when REDIS_URL is set, otherwise a process-local store.
fn build_settings_store(config: &Config) -> Result<Arc<dyn SettingsStore>> {
    match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!(
                "Recommendation settings stored in Redis under '{}'",
                config.settings_key
            );
            Ok(Arc::new(RedisSettingsStore::new(
                client,
                config.settings_key.clone(),
            )))
        }
        None => {
            warn!("REDIS_URL not set; recommendation settings will not survive restarts");
            Ok(Arc::new(InMemorySettingsStore::new()))
        }
    }
}
