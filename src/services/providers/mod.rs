/// External data provider abstraction
///
/// The engine talks to two third-party services: a catalog provider for movie
/// and TV metadata, and an embedding provider that turns descriptions into
/// vectors. Both sit behind traits so they can be swapped or faked in tests.
use crate::{
    error::{EmbeddingError, ProviderError},
    models::{CatalogItem, MediaKind},
};

pub mod cohere;
pub mod tmdb;

pub use cohere::CohereEmbedder;
pub use tmdb::TmdbCatalog;

/// Trait for catalog metadata providers
///
/// Every method is a single best-effort request: no retries and no caching.
/// Errors are recoverable and left to the caller to handle.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// One page of the popular listing for a media kind
    async fn list_popular(
        &self,
        media_kind: MediaKind,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ProviderError>;

    /// Details for a single item
    async fn get_item(&self, media_kind: MediaKind, id: u64) -> Result<CatalogItem, ProviderError>;

    /// Provider-native "similar items" for a seed item
    async fn get_recommendations_for(
        &self,
        media_kind: MediaKind,
        seed_id: u64,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ProviderError>;

    /// One page of the top-rated listing for a media kind
    async fn get_top_rated(
        &self,
        media_kind: MediaKind,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ProviderError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for text embedding providers
///
/// `embed` is one provider call. Callers must keep `texts` within the
/// provider's batch ceiling; `EmbeddingClient` does the chunking.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds one chunk of texts, returning one vector per text in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
