//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Trait for generating text embeddings
///
/// Implementations:
/// - `VertexAiEmbedder`: Google Vertex AI text embedding models
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    ///
    /// Providers without a batch endpoint keep this default, which reports
    /// the capability as missing instead of looping over `embed`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let _ = texts;
        Err(Error::unsupported(self.name(), "embed_batch"))
    }

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Model identifier used by this provider
    fn model(&self) -> &str;
}
