//! Document ingestion: format detection, extraction and chunk collection

mod collector;
mod parser;
pub mod text;

pub use collector::{DocumentCollector, SubmissionForm};
pub use parser::{FileParser, PageContent};
