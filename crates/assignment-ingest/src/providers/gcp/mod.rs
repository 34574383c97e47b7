//! Google Cloud Platform provider implementations
//!
//! - Service-account / access-token authentication
//! - Vertex AI text embeddings

mod auth;
mod vertex_embedder;

pub use auth::GcpAuth;
pub use vertex_embedder::VertexAiEmbedder;
