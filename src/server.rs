//! HTTP server initialization and runtime setup.
//!
//! Connects to PostgreSQL (with retry), applies migrations, selects the cache,
//! starts the notification worker and serves the Axum router until a shutdown
//! signal arrives.

use crate::application::services::{AuthService, CodeService, ScanService};
use crate::config::Config;
use crate::domain::notification_hub::NotificationHub;
use crate::domain::notification_worker::run_notification_worker;
use crate::infrastructure::assets::FsAssetStore;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{PgCodeRepository, PgOwnerRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::token_minter::RandomTokenMinter;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Attempts for the initial database connection.
const DB_CONNECT_ATTEMPTS: usize = 6;

/// Opens the PostgreSQL pool, retrying with exponential backoff.
///
/// Used by the server and by the admin CLI.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(DB_CONNECT_ATTEMPTS - 1);

    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let pool = Retry::spawn(strategy, || {
        let options = options.clone();
        async move {
            options.connect(&config.database_url).await.inspect_err(|e| {
                tracing::warn!("Database connection failed, retrying: {}", e);
            })
        }
    })
    .await
    .context("Failed to connect to database")?;

    Ok(pool)
}

async fn select_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Completes on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received, shutting down"),
        _ = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if the database is unreachable after retries, migrations
/// fail, the asset directory cannot be created, or the listener cannot bind.
pub async fn run(config: Config) -> Result<()> {
    let pool = Arc::new(connect_pool(&config).await?);
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(pool.as_ref())
        .await
        .context("Failed to apply migrations")?;

    let cache = select_cache(&config).await;

    let assets = Arc::new(FsAssetStore::new(&config.asset_dir, &config.base_url));
    assets.ensure_dir().await?;

    let hub = Arc::new(NotificationHub::new(config.subscriber_buffer));
    let (scan_tx, scan_rx) = mpsc::channel(config.scan_queue_capacity);
    tokio::spawn(run_notification_worker(scan_rx, hub.clone()));
    tracing::info!("Notification worker started");

    let code_repository = Arc::new(PgCodeRepository::new(pool.clone()));
    let owner_repository = Arc::new(PgOwnerRepository::new(pool.clone()));

    let state = AppState {
        code_service: Arc::new(CodeService::new(
            code_repository.clone(),
            assets,
            Arc::new(RandomTokenMinter),
            cache.clone(),
            config.max_batch_size,
        )),
        scan_service: Arc::new(ScanService::new(
            code_repository,
            cache.clone(),
            scan_tx.clone(),
        )),
        auth_service: Arc::new(AuthService::new(
            owner_repository,
            config.token_signing_secret.clone(),
        )),
        hub,
        cache,
        scan_sender: scan_tx,
    };

    let app = app_router(state, &config.asset_dir);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}
