//! assignment-ingest: document collection and text embedding for assignment generation
//!
//! Two independent pieces:
//! - [`ingestion::DocumentCollector`] turns PDF, DOCX and PPTX uploads and
//!   pasted text into an ordered list of [`TextChunk`]s.
//! - [`embedding::EmbeddingClient`] sends text to a Vertex AI embedding model
//!   and returns vectors.
//!
//! The [`server`] module exposes the collector as an HTTP form endpoint.

pub mod config;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use embedding::EmbeddingClient;
pub use error::{Error, Result};
pub use ingestion::{DocumentCollector, SubmissionForm};
pub use types::{ChunkContent, IngestResponse, SourceKind, TextChunk, Upload};
