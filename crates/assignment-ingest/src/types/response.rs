//! Status types reported back to the submitter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file that could not be processed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestError {
    /// Filename that failed
    pub filename: String,
    /// Error message
    pub error: String,
}

impl IngestError {
    pub fn new(filename: impl Into<String>, error: impl ToString) -> Self {
        Self {
            filename: filename.into(),
            error: error.to_string(),
        }
    }
}

/// Result of one handler call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Files that produced chunks (or parsed cleanly with none)
    pub files_processed: usize,
    /// Chunks appended by this call
    pub chunks_added: usize,
    /// Per-file failures; processing continued past each of them
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IngestError>,
}

impl BatchOutcome {
    /// Fold another handler's outcome into this one
    pub fn merge(&mut self, other: BatchOutcome) {
        self.files_processed += other.files_processed;
        self.chunks_added += other.chunks_added;
        self.errors.extend(other.errors);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Response for a form submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Whether every submitted item was processed without error
    pub success: bool,
    /// Chunks held by the collector after this submission
    pub total_chunks: usize,
    /// Chunks added by this submission
    pub chunks_added: usize,
    /// Files processed by this submission
    pub files_processed: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// When the submission was handled
    pub submitted_at: DateTime<Utc>,
    /// Any errors encountered (partial success)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IngestError>,
}

impl IngestResponse {
    /// User-facing status line
    pub fn status_message(&self) -> String {
        format!("Total pages processed: {}", self.total_chunks)
    }
}
