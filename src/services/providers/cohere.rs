/// Cohere embedding provider
///
/// Calls `POST /embed` with a bearer key. One call embeds at most one chunk;
/// the 96-text ceiling is enforced upstream by `EmbeddingClient`.
use crate::{
    error::{ConfigError, EmbeddingError},
    services::providers::EmbeddingProvider,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const INPUT_TYPE: &str = "search_document";

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Clone)]
pub struct CohereEmbedder {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl CohereEmbedder {
    /// Creates a new Cohere client. Fails when the API key is blank.
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingKey("EMBEDDING_API_KEY"));
        }

        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for CohereEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = format!("{}/embed", self.api_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbedRequest {
                texts,
                model: &self.model,
                input_type: INPUT_TYPE,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Decode(e.to_string()))?;

        tracing::debug!(
            texts = texts.len(),
            vectors = result.embeddings.len(),
            model = %self.model,
            provider = "cohere",
            "Embedding chunk completed"
        );

        Ok(result.embeddings)
    }

    fn name(&self) -> &'static str {
        "cohere"
    }
}
