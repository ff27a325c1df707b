use anyhow::Context;
use std::sync::Arc;

use crate::config::{config, AppConfig, Environment};
use crate::database::{AccountStore, DatabaseManager, MemoryStore, PgStore, StoreError};
use crate::routes::create_router;
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = config().clone();
    if let Some(port) = port {
        config.api.port = port;
    }

    tracing::info!(
        environment = ?config.environment,
        port = config.api.port,
        registration_enabled = config.registration.enabled,
        static_dir = ?config.api.static_dir,
        "Service configuration loaded"
    );

    let store = open_store(&config).await?;

    let port = config.api.port;
    let state = AppState::new(config, store).context("invalid configuration")?;
    let app = create_router(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("ContentDeck API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Postgres when `DATABASE_URL` is set. Only development may fall back to the
/// in-memory store.
async fn open_store(config: &AppConfig) -> Result<Arc<dyn AccountStore>, StoreError> {
    if config.database.url.is_some() {
        let pool = DatabaseManager::connect(&config.database).await?;
        DatabaseManager::migrate(&pool).await?;
        return Ok(Arc::new(PgStore::new(pool)));
    }

    match config.environment {
        Environment::Development => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, accounts will not persist");
            Ok(Arc::new(MemoryStore::new()))
        }
        Environment::Staging | Environment::Production => Err(StoreError::ConfigMissing("DATABASE_URL")),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
