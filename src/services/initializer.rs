use std::sync::Arc;

use crate::{
    error::{EmbeddingError, ProviderError},
    models::{CatalogItem, MediaKind, PooledItem},
    services::{
        embedding::{embedding_text, EmbeddingClient},
        pool::ItemPool,
        providers::CatalogProvider,
    },
};

/// Popular-listing pages fetched per media kind
pub const DEFAULT_WARMUP_PAGES: u32 = 3;

#[derive(thiserror::Error, Debug)]
enum WarmupError {
    #[error(transparent)]
    Catalog(#[from] ProviderError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("Listing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Fills the item pool once at process start
///
/// Pulls the popular movie and TV listings, embeds every overview in one
/// batch, and stores the result. Any failure leaves the pool empty; the
/// engine then serves from the fallback path.
pub struct PoolInitializer {
    catalog: Arc<dyn CatalogProvider>,
    embedder: EmbeddingClient,
    pool: Arc<ItemPool>,
    pages: u32,
}

impl PoolInitializer {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        embedder: EmbeddingClient,
        pool: Arc<ItemPool>,
    ) -> Self {
        Self {
            catalog,
            embedder,
            pool,
            pages: DEFAULT_WARMUP_PAGES,
        }
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    /// Warms the pool, returning the number of entries added
    ///
    /// Never fails: errors are logged and reported as zero entries.
    pub async fn run(self) -> usize {
        tracing::info!(
            pages = self.pages,
            provider = self.catalog.name(),
            "Warming item pool"
        );

        match self.warm().await {
            Ok(added) => {
                tracing::info!(items = added, "Item pool warmed");
                added
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Item pool warm-up failed, recommendations will use fallback"
                );
                0
            }
        }
    }

    async fn warm(&self) -> Result<usize, WarmupError> {
        let candidates = self.fetch_candidates().await?;
        if candidates.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = candidates
            .iter()
            .map(|item| embedding_text(&item.overview))
            .collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let pooled = candidates
            .into_iter()
            .zip(embeddings)
            .map(|(item, embedding)| PooledItem::new(item, embedding));

        Ok(self.pool.insert_many(pooled.collect::<Vec<_>>()).await)
    }

    /// Fetches every listing page in parallel, flattened movie pages first
    async fn fetch_candidates(&self) -> Result<Vec<CatalogItem>, WarmupError> {
        let mut tasks = Vec::new();

        for media_kind in [MediaKind::Movie, MediaKind::Tv] {
            for page in 1..=self.pages {
                let catalog = self.catalog.clone();
                tasks.push(tokio::spawn(async move {
                    catalog.list_popular(media_kind, page).await
                }));
            }
        }

        let mut candidates = Vec::new();
        for task in tasks {
            candidates.extend(task.await??);
        }

        tracing::debug!(candidates = candidates.len(), "Fetched warm-up candidates");

        Ok(candidates)
    }
}
