//! HTTP server initialization and lifecycle.
//!
//! Connects to PostgreSQL and the cache, applies migrations, wires services
//! into [`AppState`], starts the expiry sweeper and serves until SIGINT or
//! SIGTERM. On shutdown the sweeper is stopped and in-flight background work
//! gets a grace period to finish.

use crate::application::background::BackgroundTasks;
use crate::application::expiry_sweeper::run_expiry_sweeper;
use crate::application::services::{AuthService, LinkService, LinkSettings, RateLimiter};
use crate::config::Config;
use crate::domain::repositories::{ApiKeyRepository, LinkRepository};
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{PgApiKeyRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Picks the cache backend.
///
/// Redis when configured and reachable, [`NullCache`] when configured but
/// unreachable, [`MemoryCache`] when not configured.
async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    match &config.redis_url {
        Some(redis_url) => match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, caching and rate limiting disabled");
                Arc::new(NullCache::new())
            }
        },
        None => {
            tracing::info!("Cache enabled (in-process)");
            Arc::new(MemoryCache::new())
        }
    }
}

/// Runs the HTTP server until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail or the
/// listener cannot bind.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    let cache = connect_cache(&config).await;
    let background = BackgroundTasks::new(
        config.background_task_limit,
        config.background_task_timeout(),
    );

    let pool = Arc::new(pool);
    let link_repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let key_repository: Arc<dyn ApiKeyRepository> = Arc::new(PgApiKeyRepository::new(pool));

    let link_service = Arc::new(LinkService::new(
        link_repository,
        cache.clone(),
        background.clone(),
        LinkSettings {
            code_length: config.short_code_length,
            cache_ttl: config.cache_ttl(),
            base_url: config.base_url.clone(),
            default_link_ttl: config.default_link_ttl(),
        },
    ));
    let auth_service = Arc::new(AuthService::new(key_repository, background.clone()));
    let rate_limiter = Arc::new(RateLimiter::new(
        cache.clone(),
        config.rate_limit_window(),
        config.rate_limit_rpm,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = tokio::spawn(run_expiry_sweeper(
        link_service.clone(),
        config.cleanup_interval(),
        shutdown_rx,
    ));

    let state = AppState::new(
        link_service,
        auth_service,
        rate_limiter,
        cache,
        background.clone(),
        config.behind_proxy,
    );

    let app = app_router(state, config.request_timeout());

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, draining background work");
    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Expiry sweeper ended abnormally");
    }

    if background.wait_idle(config.shutdown_grace()).await {
        tracing::info!("Background work drained");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
