use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::ProviderError,
    models::{CatalogItem, MediaKind, PooledItem, RecommendationItem},
    services::{
        embedding::{embedding_text, EmbeddingClient},
        pool::ItemPool,
        providers::CatalogProvider,
        similarity::{centroid, cosine_similarity},
    },
};

pub const DEFAULT_RECOMMENDATION_COUNT: usize = 10;

/// Inputs for one recommendation call
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub media_kind: MediaKind,
    /// Items the user liked, in the caller's order. The first one seeds the
    /// provider-native fallback.
    pub liked_ids: Vec<u64>,
    /// Items never to return
    pub exclude_ids: HashSet<u64>,
    pub count: usize,
}

impl RecommendationRequest {
    pub fn new(media_kind: MediaKind) -> Self {
        Self {
            media_kind,
            liked_ids: Vec::new(),
            exclude_ids: HashSet::new(),
            count: DEFAULT_RECOMMENDATION_COUNT,
        }
    }

    /// Sets the liked ids, dropping repeats but keeping first-seen order
    pub fn liked(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        let mut seen = HashSet::new();
        self.liked_ids = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        self
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.exclude_ids = ids.into_iter().collect();
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

/// Content-based recommender over the shared item pool
///
/// Scores pool entries against the centroid of the user's liked embeddings.
/// When the pool is empty, or none of the liked items can be embedded, it
/// falls back to the catalog's own "similar" and "top rated" listings.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogProvider>,
    embedder: EmbeddingClient,
    pool: Arc<ItemPool>,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        embedder: EmbeddingClient,
        pool: Arc<ItemPool>,
    ) -> Self {
        Self {
            catalog,
            embedder,
            pool,
        }
    }

    /// Returns at most `request.count` recommendations
    ///
    /// Only errors from the fallback's own catalog calls are returned; failures
    /// while embedding liked items are logged and degrade into the fallback.
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationItem>, ProviderError> {
        if request.count == 0 {
            return Ok(Vec::new());
        }

        if self.pool.is_empty().await {
            tracing::debug!(media_kind = %request.media_kind, "Item pool empty");
            return self.fallback(request).await;
        }

        self.embed_missing_liked(request.media_kind, &request.liked_ids)
            .await;

        let liked: HashSet<u64> = request.liked_ids.iter().copied().collect();
        let ranked = self
            .pool
            .read(|items| {
                let liked_vectors = items
                    .iter()
                    .filter(|p| p.item.media_kind == request.media_kind && liked.contains(&p.item.id))
                    .map(|p| p.embedding.as_slice());

                centroid(liked_vectors).map(|target| {
                    rank_by_similarity(
                        items,
                        request.media_kind,
                        &target,
                        &request.exclude_ids,
                        request.count,
                    )
                })
            })
            .await;

        match ranked {
            Some(items) => {
                tracing::info!(
                    media_kind = %request.media_kind,
                    liked = request.liked_ids.len(),
                    results = items.len(),
                    strategy = "centroid",
                    "Recommendations computed"
                );
                Ok(items)
            }
            None => {
                tracing::debug!(
                    media_kind = %request.media_kind,
                    liked = request.liked_ids.len(),
                    "No liked embeddings available"
                );
                self.fallback(request).await
            }
        }
    }

    /// Fetches and embeds liked items that are not yet pooled
    ///
    /// Best effort: an id that cannot be fetched is skipped, and a failed
    /// embedding call adds nothing.
    async fn embed_missing_liked(&self, media_kind: MediaKind, liked_ids: &[u64]) {
        let missing = self.pool.missing(media_kind, liked_ids).await;
        if missing.is_empty() {
            return;
        }

        let fetched = self.fetch_items(media_kind, missing).await;
        if fetched.is_empty() {
            return;
        }

        let texts: Vec<String> = fetched
            .iter()
            .map(|item| embedding_text(&item.overview))
            .collect();

        match self.embedder.embed_batch(&texts).await {
            Ok(embeddings) => {
                let pooled: Vec<PooledItem> = fetched
                    .into_iter()
                    .zip(embeddings)
                    .map(|(item, embedding)| PooledItem::new(item, embedding))
                    .collect();
                let added = self.pool.insert_many(pooled).await;
                tracing::info!(
                    media_kind = %media_kind,
                    added = added,
                    "Embedded liked items on demand"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    media_kind = %media_kind,
                    items = texts.len(),
                    "On-demand embedding failed"
                );
            }
        }
    }

    /// Fetches item details in parallel, skipping ids that fail
    async fn fetch_items(&self, media_kind: MediaKind, ids: Vec<u64>) -> Vec<CatalogItem> {
        let mut tasks = Vec::new();

        for id in ids {
            let catalog = self.catalog.clone();
            let task = tokio::spawn(async move { (id, catalog.get_item(media_kind, id).await) });
            tasks.push(task);
        }

        let mut items = Vec::new();

        for task in tasks {
            match task.await {
                Ok((_, Ok(item))) => items.push(item),
                Ok((id, Err(e))) => {
                    tracing::warn!(
                        error = %e,
                        item_id = id,
                        media_kind = %media_kind,
                        provider = self.catalog.name(),
                        "Skipping liked item that could not be fetched"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                }
            }
        }

        items
    }

    /// Provider-native recommendations for the first liked id, then top rated
    async fn fallback(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationItem>, ProviderError> {
        if let Some(&seed_id) = request.liked_ids.first() {
            let similar = self
                .catalog
                .get_recommendations_for(request.media_kind, seed_id, 1)
                .await?;
            let items = take_unexcluded(similar, &request.exclude_ids, request.count);

            if !items.is_empty() {
                tracing::info!(
                    media_kind = %request.media_kind,
                    seed_id = seed_id,
                    results = items.len(),
                    strategy = "provider_similar",
                    "Recommendations computed"
                );
                return Ok(items);
            }
        }

        let top_rated = self.catalog.get_top_rated(request.media_kind, 1).await?;
        let items = take_unexcluded(top_rated, &request.exclude_ids, request.count);

        tracing::info!(
            media_kind = %request.media_kind,
            results = items.len(),
            strategy = "top_rated",
            "Recommendations computed"
        );

        Ok(items)
    }
}

/// Scores pool entries of one kind against `target`, highest first
///
/// The sort is stable, so equal scores keep pool order.
fn rank_by_similarity(
    items: &[PooledItem],
    media_kind: MediaKind,
    target: &[f32],
    exclude_ids: &HashSet<u64>,
    count: usize,
) -> Vec<RecommendationItem> {
    let mut scored: Vec<(f64, &PooledItem)> = items
        .iter()
        .filter(|p| p.item.media_kind == media_kind && !exclude_ids.contains(&p.item.id))
        .map(|p| (cosine_similarity(&p.embedding, target), p))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .take(count)
        .map(|(_, p)| RecommendationItem::from(&p.item))
        .collect()
}

fn take_unexcluded(
    items: Vec<CatalogItem>,
    exclude_ids: &HashSet<u64>,
    count: usize,
) -> Vec<RecommendationItem> {
    items
        .into_iter()
        .filter(|item| !exclude_ids.contains(&item.id))
        .take(count)
        .map(RecommendationItem::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbeddingError;
    use crate::services::pool::tests::pooled;
    use crate::services::providers::{MockCatalogProvider, MockEmbeddingProvider};
    use mockall::predicate::eq;

    fn catalog_item(id: u64, media_kind: MediaKind) -> CatalogItem {
        CatalogItem {
            id,
            title: format!("Item {}", id),
            overview: format!("Overview {}", id),
            poster_path: Some(format!("/{}.jpg", id)),
            vote_average: 6.5,
            media_kind,
        }
    }

    fn catalog_items(ids: impl IntoIterator<Item = u64>) -> Vec<CatalogItem> {
        ids.into_iter().map(|id| catalog_item(id, MediaKind::Movie)).collect()
    }

    /// Catalog mock that fails the test on any call
    fn quiet_catalog() -> MockCatalogProvider {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_get_item().never();
        catalog.expect_get_recommendations_for().never();
        catalog.expect_get_top_rated().never();
        catalog.expect_name().return_const("mock");
        catalog
    }

    fn silent_embedder() -> EmbeddingClient {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().never();
        provider.expect_name().return_const("mock");
        EmbeddingClient::new(Arc::new(provider))
    }

    fn engine(
        catalog: MockCatalogProvider,
        embedder: EmbeddingClient,
        pool: Arc<ItemPool>,
    ) -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(catalog), embedder, pool)
    }

    async fn warm_pool() -> Arc<ItemPool> {
        let pool = Arc::new(ItemPool::new());
        pool.insert_many(vec![
            pooled(1, MediaKind::Movie, vec![1.0, 0.0]),
            pooled(2, MediaKind::Movie, vec![0.0, 1.0]),
            pooled(3, MediaKind::Movie, vec![0.9, 0.1]),
        ])
        .await;
        pool
    }

    fn ids(items: &[RecommendationItem]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    #[tokio::test]
    async fn test_warm_pool_single_like_ranks_by_cosine() {
        let engine = engine(quiet_catalog(), silent_embedder(), warm_pool().await);
        let request = RecommendationRequest::new(MediaKind::Movie).liked([1]).count(3);

        let items = engine.recommend(&request).await.unwrap();

        assert_eq!(ids(&items), vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn test_excluded_ids_never_returned_from_pool() {
        let engine = engine(quiet_catalog(), silent_embedder(), warm_pool().await);
        let request = RecommendationRequest::new(MediaKind::Movie)
            .liked([1])
            .excluding([1, 3])
            .count(3);

        let items = engine.recommend(&request).await.unwrap();

        assert_eq!(ids(&items), vec![2]);
    }

    #[tokio::test]
    async fn test_short_result_does_not_trigger_fallback() {
        let engine = engine(quiet_catalog(), silent_embedder(), warm_pool().await);
        let request = RecommendationRequest::new(MediaKind::Movie)
            .liked([1])
            .excluding([1, 2, 3])
            .count(10);

        let items = engine.recommend(&request).await.unwrap();

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_ties_keep_pool_order() {
        let pool = Arc::new(ItemPool::new());
        pool.insert_many(vec![
            pooled(10, MediaKind::Movie, vec![1.0, 0.0]),
            pooled(11, MediaKind::Movie, vec![0.0, 2.0]),
            pooled(12, MediaKind::Movie, vec![0.0, 1.0]),
            pooled(13, MediaKind::Movie, vec![2.0, 2.0]),
            pooled(14, MediaKind::Movie, vec![1.0, 1.0]),
        ])
        .await;
        let engine = engine(quiet_catalog(), silent_embedder(), pool);
        let request = RecommendationRequest::new(MediaKind::Movie)
            .liked([10])
            .excluding([10]);

        let items = engine.recommend(&request).await.unwrap();

        assert_eq!(ids(&items), vec![13, 14, 11, 12]);
    }

    #[tokio::test]
    async fn test_other_media_kind_is_ignored() {
        let pool = warm_pool().await;
        pool.insert_many(vec![pooled(4, MediaKind::Tv, vec![1.0, 0.0])])
            .await;
        let engine = engine(quiet_catalog(), silent_embedder(), pool);
        let request = RecommendationRequest::new(MediaKind::Movie).liked([1]);

        let items = engine.recommend(&request).await.unwrap();

        assert_eq!(ids(&items), vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn test_multiple_likes_use_centroid() {
        let engine = engine(quiet_catalog(), silent_embedder(), warm_pool().await);
        // centroid of [1,0] and [0,1] is [0.5,0.5]; item 3 is the closest unliked
        let request = RecommendationRequest::new(MediaKind::Movie)
            .liked([1, 2])
            .excluding([1, 2]);

        let items = engine.recommend(&request).await.unwrap();

        assert_eq!(ids(&items), vec![3]);
    }

    #[tokio::test]
    async fn test_cold_start_uses_provider_similar() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_get_recommendations_for()
            .with(eq(MediaKind::Movie), eq(42), eq(1))
            .times(1)
            .returning(|_, _, _| Ok(catalog_items(100..110)));
        catalog.expect_get_top_rated().never();
        catalog.expect_name().return_const("mock");

        let engine = engine(catalog, silent_embedder(), Arc::new(ItemPool::new()));
        let request = RecommendationRequest::new(MediaKind::Movie).liked([42]).count(5);

        let items = engine.recommend(&request).await.unwrap();

        assert_eq!(ids(&items), vec![100, 101, 102, 103, 104]);
        assert_eq!(items[0].title, "Item 100");
        assert_eq!(items[0].poster_path, Some("/100.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_fallback_seed_is_first_liked_id() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_get_recommendations_for()
            .with(eq(MediaKind::Tv), eq(7), eq(1))
            .times(1)
            .returning(|_, _, _| Ok(vec![catalog_item(70, MediaKind::Tv)]));
        catalog.expect_name().return_const("mock");

        let engine = engine(catalog, silent_embedder(), Arc::new(ItemPool::new()));
        let request = RecommendationRequest::new(MediaKind::Tv).liked([7, 9, 7]);

        let items = engine.recommend(&request).await.unwrap();

        assert_eq!(request.liked_ids, vec![7, 9]);
        assert_eq!(ids(&items), vec![70]);
    }

    #[tokio::test]
    async fn test_fallback_filters_exclusions_then_top_rated() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_get_recommendations_for()
            .times(1)
            .returning(|_, _, _| Ok(catalog_items([5, 6])));
        catalog
            .expect_get_top_rated()
            .with(eq(MediaKind::Movie), eq(1))
            .times(1)
            .returning(|_, _| Ok(catalog_items([5, 8, 9])));
        catalog.expect_name().return_const("mock");

        let engine = engine(catalog, silent_embedder(), Arc::new(ItemPool::new()));
        let request = RecommendationRequest::new(MediaKind::Movie)
            .liked([5])
            .excluding([5, 6]);

        let items = engine.recommend(&request).await.unwrap();

        assert_eq!(ids(&items), vec![8, 9]);
    }

    #[tokio::test]
    async fn test_no_likes_goes_straight_to_top_rated() {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_get_recommendations_for().never();
        catalog
            .expect_get_top_rated()
            .times(1)
            .returning(|_, _| Ok(catalog_items(1..=20)));
        catalog.expect_name().return_const("mock");

        let engine = engine(catalog, silent_embedder(), warm_pool().await);
        let request = RecommendationRequest::new(MediaKind::Movie);

        let items = engine.recommend(&request).await.unwrap();

        assert_eq!(items.len(), DEFAULT_RECOMMENDATION_COUNT);
    }

    #[tokio::test]
    async fn test_missing_liked_item_is_embedded_on_demand() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_get_item()
            .with(eq(MediaKind::Movie), eq(99))
            .times(1)
            .returning(|kind, id| Ok(catalog_item(id, kind)));
        catalog.expect_get_recommendations_for().never();
        catalog.expect_get_top_rated().never();
        catalog.expect_name().return_const("mock");

        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .withf(|texts: &[String]| texts.to_vec() == vec!["Overview 99"])
            .times(1)
            .returning(|_| Ok(vec![vec![0.0, 1.0]]));
        provider.expect_name().return_const("mock");

        let pool = warm_pool().await;
        let engine = engine(catalog, EmbeddingClient::new(Arc::new(provider)), pool.clone());
        let request = RecommendationRequest::new(MediaKind::Movie)
            .liked([99])
            .excluding([99]);

        let items = engine.recommend(&request).await.unwrap();

        assert!(pool.contains(MediaKind::Movie, 99).await);
        assert_eq!(pool.len().await, 4);
        assert_eq!(ids(&items), vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_embedding_outage_falls_back_to_top_rated() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_get_item()
            .times(1)
            .returning(|kind, id| Ok(catalog_item(id, kind)));
        catalog
            .expect_get_recommendations_for()
            .with(eq(MediaKind::Movie), eq(99), eq(1))
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        catalog
            .expect_get_top_rated()
            .times(1)
            .returning(|_, _| Ok(catalog_items([200, 201])));
        catalog.expect_name().return_const("mock");

        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().times(1).returning(|_| {
            Err(EmbeddingError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        });
        provider.expect_name().return_const("mock");

        let pool = warm_pool().await;
        let engine = engine(catalog, EmbeddingClient::new(Arc::new(provider)), pool.clone());
        let request = RecommendationRequest::new(MediaKind::Movie).liked([99]);

        let items = engine.recommend(&request).await.unwrap();

        assert!(!pool.contains(MediaKind::Movie, 99).await);
        assert_eq!(ids(&items), vec![200, 201]);
    }

    #[tokio::test]
    async fn test_unfetchable_liked_item_is_skipped() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_get_item()
            .with(eq(MediaKind::Movie), eq(404))
            .returning(|_, _| {
                Err(ProviderError::Status {
                    status: 404,
                    body: "not found".to_string(),
                })
            });
        catalog
            .expect_get_item()
            .with(eq(MediaKind::Movie), eq(50))
            .returning(|kind, id| Ok(catalog_item(id, kind)));
        catalog.expect_get_recommendations_for().never();
        catalog.expect_get_top_rated().never();
        catalog.expect_name().return_const("mock");

        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .withf(|texts: &[String]| texts.len() == 1)
            .times(1)
            .returning(|_| Ok(vec![vec![1.0, 0.0]]));
        provider.expect_name().return_const("mock");

        let pool = warm_pool().await;
        let engine = engine(catalog, EmbeddingClient::new(Arc::new(provider)), pool.clone());
        let request = RecommendationRequest::new(MediaKind::Movie)
            .liked([404, 50])
            .excluding([404, 50]);

        let items = engine.recommend(&request).await.unwrap();

        assert!(pool.contains(MediaKind::Movie, 50).await);
        assert!(!pool.contains(MediaKind::Movie, 404).await);
        assert_eq!(ids(&items), vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn test_fallback_error_propagates() {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_get_top_rated().returning(|_, _| {
            Err(ProviderError::Status {
                status: 500,
                body: "oops".to_string(),
            })
        });
        catalog.expect_name().return_const("mock");

        let engine = engine(catalog, silent_embedder(), Arc::new(ItemPool::new()));
        let request = RecommendationRequest::new(MediaKind::Movie);

        let result = engine.recommend(&request).await;
        assert!(matches!(result, Err(ProviderError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_zero_count_makes_no_calls() {
        let engine = engine(quiet_catalog(), silent_embedder(), Arc::new(ItemPool::new()));
        let request = RecommendationRequest::new(MediaKind::Movie).liked([1]).count(0);

        assert!(engine.recommend(&request).await.unwrap().is_empty());
    }

    #[test]
    fn test_rank_by_similarity_zero_vector_scores_zero() {
        let items = vec![
            pooled(1, MediaKind::Movie, vec![0.0, 0.0]),
            pooled(2, MediaKind::Movie, vec![-1.0, 0.0]),
            pooled(3, MediaKind::Movie, vec![1.0, 0.0]),
        ];

        let ranked = rank_by_similarity(&items, MediaKind::Movie, &[1.0, 0.0], &HashSet::new(), 3);

        assert_eq!(ids(&ranked), vec![3, 1, 2]);
    }
}
