/// TMDB catalog provider
///
/// Endpoints used:
/// - `/{kind}/popular` and `/{kind}/top_rated` for paginated listings
/// - `/{kind}/{id}` for single-item details
/// - `/{kind}/{id}/recommendations` for provider-native similar items
///
/// The API key travels as the `api_key` query parameter.
use crate::{
    error::{ConfigError, ProviderError},
    models::{ApiItem, ApiListResponse, CatalogItem, MediaKind},
    services::providers::CatalogProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    /// Creates a new TMDB client. Fails when the API key is blank.
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingKey("CATALOG_API_KEY"));
        }

        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        page: Option<u32>,
    ) -> Result<T, ProviderError> {
        let mut request = self
            .http_client
            .get(self.url(path))
            .query(&[("api_key", self.api_key.as_str())]);

        if let Some(page) = page {
            request = request.query(&[("page", page)]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                path = %path,
                status = %status,
                provider = "tmdb",
                "Catalog request failed"
            );
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response_text = response.text().await?;

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                provider = "tmdb",
                "Failed to deserialize catalog response"
            );
            ProviderError::Decode(e.to_string())
        })
    }

    async fn list(
        &self,
        path: &str,
        media_kind: MediaKind,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ProviderError> {
        let listing: ApiListResponse = self.get_json(path, Some(page)).await?;

        let items: Vec<CatalogItem> = listing
            .results
            .into_iter()
            .map(|item| item.into_catalog_item(media_kind))
            .collect();

        tracing::debug!(
            path = %path,
            page = page,
            results = items.len(),
            provider = "tmdb",
            "Catalog listing fetched"
        );

        Ok(items)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbCatalog {
    async fn list_popular(
        &self,
        media_kind: MediaKind,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ProviderError> {
        self.list(&format!("{}/popular", media_kind), media_kind, page)
            .await
    }

    async fn get_item(&self, media_kind: MediaKind, id: u64) -> Result<CatalogItem, ProviderError> {
        let item: ApiItem = self
            .get_json(&format!("{}/{}", media_kind, id), None)
            .await?;
        Ok(item.into_catalog_item(media_kind))
    }

    async fn get_recommendations_for(
        &self,
        media_kind: MediaKind,
        seed_id: u64,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ProviderError> {
        self.list(
            &format!("{}/{}/recommendations", media_kind, seed_id),
            media_kind,
            page,
        )
        .await
    }

    async fn get_top_rated(
        &self,
        media_kind: MediaKind,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ProviderError> {
        self.list(&format!("{}/top_rated", media_kind), media_kind, page)
            .await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
