//! Application state for the form server

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::ingestion::{DocumentCollector, SubmissionForm};
use crate::types::{IngestResponse, TextChunk};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The collector behind the form; one submission is processed at a time
    collector: Arc<Mutex<DocumentCollector>>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: &AppConfig) -> Self {
        let collector = DocumentCollector::with_config(&config.collector);
        tracing::info!("Staging uploads in {}", collector.temp_dir().display());

        Self {
            collector: Arc::new(Mutex::new(collector)),
        }
    }

    /// Run a submission through the collector off the async runtime
    pub async fn submit(&self, form: SubmissionForm) -> Result<IngestResponse> {
        let mut collector = Arc::clone(&self.collector).lock_owned().await;
        tokio::task::spawn_blocking(move || collector.ingest_documents(form))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))
    }

    /// Snapshot of the collected chunks
    pub async fn chunks(&self) -> Vec<TextChunk> {
        self.collector.lock().await.pages().to_vec()
    }

    /// Number of collected chunks
    pub async fn total_chunks(&self) -> usize {
        self.collector.lock().await.len()
    }
}
