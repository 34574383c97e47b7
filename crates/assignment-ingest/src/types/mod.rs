//! Core types shared by the collector, the form server and the embedding client

pub mod chunk;
pub mod response;

pub use chunk::{ChunkContent, SourceKind, TextChunk, Upload};
pub use response::{BatchOutcome, IngestError, IngestResponse};
