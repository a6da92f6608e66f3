use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use reelmatch_api::{
    api::{create_router, AppState},
    config::Config,
    services::{
        providers::{CatalogProvider, CohereEmbedder, EmbeddingProvider, TmdbCatalog},
        EmbeddingClient, ItemPool, PoolInitializer, RecommendationEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let catalog: Arc<dyn CatalogProvider> = Arc::new(
        TmdbCatalog::new(
            config.catalog_api_key.clone(),
            config.catalog_api_url.clone(),
            timeout,
        )
        .context("Failed to create catalog client")?,
    );
    let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(
        CohereEmbedder::new(
            config.embedding_api_key.clone(),
            config.embedding_api_url.clone(),
            config.embedding_model.clone(),
            timeout,
        )
        .context("Failed to create embedding client")?,
    );
    let embedder = EmbeddingClient::new(embedding_provider);

    let pool = Arc::new(ItemPool::new());

    // Warm-up runs once in the background; requests before it finishes use the fallback
    let initializer = PoolInitializer::new(catalog.clone(), embedder.clone(), pool.clone())
        .with_pages(config.warmup_pages);
    tokio::spawn(initializer.run());

    let engine = RecommendationEngine::new(catalog, embedder, pool.clone());
    let app = create_router(AppState::new(engine, pool));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
