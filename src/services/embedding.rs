use std::sync::Arc;

use crate::{error::EmbeddingError, services::providers::EmbeddingProvider};

/// Maximum number of texts sent in one provider call
pub const EMBED_BATCH_SIZE: usize = 96;

/// Sent in place of an empty description so every item gets a usable vector
pub const EMPTY_TEXT_PLACEHOLDER: &str = "No description";

/// Returns the text to embed for an item description
pub fn embedding_text(overview: &str) -> String {
    if overview.trim().is_empty() {
        EMPTY_TEXT_PLACEHOLDER.to_string()
    } else {
        overview.to_string()
    }
}

/// Batches texts through an `EmbeddingProvider`
///
/// Chunks are submitted one after another and concatenated in order, so the
/// output lines up index-for-index with the input.
#[derive(Clone)]
pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl EmbeddingClient {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_batch_size(provider, EMBED_BATCH_SIZE)
    }

    pub fn with_batch_size(provider: Arc<dyn EmbeddingProvider>, batch_size: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
        }
    }

    /// Embeds every text, returning exactly one vector per input
    ///
    /// All-or-nothing: if any chunk fails, or returns the wrong number of
    /// vectors, the whole call fails and nothing is returned.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prepared: Vec<String> = texts.iter().map(|t| embedding_text(t)).collect();
        let mut embeddings = Vec::with_capacity(prepared.len());

        for (chunk_index, chunk) in prepared.chunks(self.batch_size).enumerate() {
            let vectors = self.provider.embed(chunk).await.map_err(|e| {
                tracing::warn!(
                    error = %e,
                    chunk = chunk_index,
                    chunk_size = chunk.len(),
                    provider = self.provider.name(),
                    "Embedding chunk failed"
                );
                e
            })?;

            if vectors.len() != chunk.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: chunk.len(),
                    actual: vectors.len(),
                });
            }

            embeddings.extend(vectors);
        }

        tracing::debug!(
            texts = texts.len(),
            chunks = texts.len().div_ceil(self.batch_size),
            provider = self.provider.name(),
            "Embedded batch"
        );

        Ok(embeddings)
    }
}
