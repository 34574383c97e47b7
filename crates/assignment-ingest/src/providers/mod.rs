//! Embedding provider abstraction and the Vertex AI implementation

pub mod embedding;
pub mod gcp;

pub use embedding::EmbeddingProvider;
