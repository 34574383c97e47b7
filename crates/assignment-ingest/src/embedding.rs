//! Embedding client: a thin wrapper over a configured provider

use std::sync::Arc;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::providers::gcp::{GcpAuth, VertexAiEmbedder};
use crate::providers::EmbeddingProvider;

/// Turns text into vectors through a remote embedding provider
#[derive(Clone)]
pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingClient {
    /// Connect to a Vertex AI model.
    ///
    /// Credentials come from `VERTEX_ACCESS_TOKEN` or the service-account key
    /// named by `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn new(
        model_name: impl Into<String>,
        project: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self> {
        Self::from_config(&EmbeddingConfig::new(model_name, project, location))
    }

    /// Connect using injected configuration
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        config.validate()?;

        let auth = Arc::new(GcpAuth::from_config(
            &config.credentials,
            config.project.clone(),
        )?);
        let embedder = VertexAiEmbedder::new(auth, config)?;

        tracing::info!(
            "Embedding client ready (model: {}, project: {}, location: {})",
            config.model,
            config.project,
            config.location
        );

        Ok(Self::with_provider(Arc::new(embedder)))
    }

    /// Wrap an existing provider
    pub fn with_provider(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Underlying provider
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Embed a single query. Provider failures are returned to the caller.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.provider.embed(query).await
    }

    /// Embed several documents.
    ///
    /// Returns `Ok(None)` when the provider has no batch operation; any other
    /// provider failure is returned as an error.
    pub async fn embed_documents(&self, documents: &[String]) -> Result<Option<Vec<Vec<f32>>>> {
        match self.provider.embed_batch(documents).await {
            Ok(vectors) => Ok(Some(vectors)),
            Err(Error::Unsupported { provider, operation }) => {
                tracing::warn!(
                    "Method {} not defined for the {} client",
                    operation,
                    provider
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for EmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .finish()
    }
}
