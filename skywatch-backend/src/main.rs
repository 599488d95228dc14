use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use skywatch_backend::astro::{MeanEquatorTransform, ObservabilityCalculator, TzfLookup};
use skywatch_backend::cache::{self, CachePolicy, TargetCache};
use skywatch_backend::catalog::CatalogProvider;
use skywatch_backend::config;
use skywatch_backend::http::{create_router, AppState};
use skywatch_backend::pool::TaskPool;
use skywatch_backend::resolver::{HorizonsClient, PositionResolver, SesameClient};
use skywatch_backend::service::TargetService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::read_config()?;

    // Initialize logging
    let _logging_guard = skywatch_backend::logging::init_logging(
        &config.log_dir,
        "skywatch-backend",
        &config.log_level,
    )?;

    tracing::info!("Skywatch backend starting...");
    if !Path::new(&config::config_path()).exists() {
        tracing::warn!(
            "Config file '{}' not found, using defaults",
            config::config_path()
        );
    }

    let pool = TaskPool::new(
        config.pool.worker_pool_size,
        Duration::from_secs(config.pool.collaborator_timeout_secs),
    );
    tracing::info!(
        "Collaborator pool: {} workers, {}s timeout",
        pool.size(),
        config.pool.collaborator_timeout_secs
    );

    let http_client = reqwest::Client::builder()
        .user_agent(&config.endpoints.user_agent)
        .build()
        .context("Failed to build HTTP client")?;

    let transform = Arc::new(MeanEquatorTransform);
    let resolver = PositionResolver::new(
        Arc::new(SesameClient::new(http_client.clone(), &config.endpoints.sesame_url)),
        Arc::new(HorizonsClient::new(http_client, &config.endpoints.horizons_url)),
        transform.clone(),
        pool.clone(),
    );

    tracing::info!("Loading timezone boundaries...");
    let calculator = ObservabilityCalculator::new(
        transform,
        Arc::new(TzfLookup::new()),
        config.observability.sample_count,
        config.observability.window_hours,
    );

    let target_cache = Arc::new(TargetCache::new(CachePolicy::from(&config.cache)));
    let _prune_task = cache::start_prune_task(
        target_cache.clone(),
        Duration::from_secs(config.cache.retention_hours * 3600),
        Duration::from_secs(config.cache.prune_interval_minutes.max(1) * 60),
    );

    let catalog = CatalogProvider::new(&config.catalog_path, pool);
    tracing::info!("Serving catalog from {}", catalog.path().display());

    let state = AppState::new(
        Arc::new(TargetService::new(resolver, calculator, target_cache)),
        Arc::new(catalog),
    );
    let app = create_router(state);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Skywatch backend stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
