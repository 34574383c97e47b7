//! Vertex AI text embedding provider

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::auth::GcpAuth;
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;

/// Vertex AI embedding provider
pub struct VertexAiEmbedder {
    auth: Arc<GcpAuth>,
    http: reqwest::Client,
    model: String,
    location: String,
    base_url: String,
    max_batch_size: usize,
}

impl VertexAiEmbedder {
    /// Create a new Vertex AI embedder for `config.model` in `config.location`
    pub fn new(auth: Arc<GcpAuth>, config: &EmbeddingConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com", config.location));

        Ok(Self {
            auth,
            http,
            model: config.model.clone(),
            location: config.location.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_batch_size: config.max_batch_size.max(1),
        })
    }

    /// Get the API endpoint URL
    fn endpoint(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:predict",
            self.base_url,
            self.auth.project_id(),
            self.location,
            self.model
        )
    }

    /// One predict call; returns one vector per instance, in order
    async fn predict(&self, texts: &[String], task_type: &'static str) -> Result<Vec<Vec<f32>>> {
        let token = self.auth.get_token().await?;

        let request = EmbedRequest {
            instances: texts
                .iter()
                .map(|t| EmbedInstance {
                    content: t.as_str(),
                    task_type,
                })
                .collect(),
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Vertex AI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Vertex AI embedding failed ({}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse Vertex AI response: {}", e)))?;

        if embed_response.predictions.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Vertex AI returned {} embeddings for {} inputs",
                embed_response.predictions.len(),
                texts.len()
            )));
        }

        Ok(embed_response
            .predictions
            .into_iter()
            .map(|p| p.embeddings.values)
            .collect())
    }
}

#[derive(serde::Serialize)]
struct EmbedRequest<'a> {
    instances: Vec<EmbedInstance<'a>>,
}

#[derive(serde::Serialize)]
struct EmbedInstance<'a> {
    content: &'a str,
    task_type: &'static str,
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    predictions: Vec<EmbedPrediction>,
}

#[derive(serde::Deserialize)]
struct EmbedPrediction {
    embeddings: EmbeddingValues,
}

#[derive(serde::Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for VertexAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.predict(&[text.to_string()], "RETRIEVAL_QUERY")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embedding in response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.max_batch_size) {
            tracing::debug!("Embedding batch of {} texts with {}", chunk.len(), self.model);
            all_embeddings.extend(self.predict(chunk, "RETRIEVAL_DOCUMENT").await?);
        }

        Ok(all_embeddings)
    }

    fn name(&self) -> &str {
        "vertex-ai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
