//! Chunk types with source tagging
//!
//! Every extractor produces [`TextChunk`]s. The shape of the extracted text
//! differs per format (a PDF page, a DOCX paragraph, the lines of a slide or
//! of pasted text), so the content is an enum rather than a bare string.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of source a chunk was extracted from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Microsoft PowerPoint presentation (.pptx)
    Pptx,
    /// Text pasted into the form
    Text,
}

impl SourceKind {
    /// Detect source kind from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Pptx => "PowerPoint (.pptx)",
            Self::Text => "Text",
        }
    }
}

/// Extracted text, shaped by the format it came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChunkContent {
    /// One PDF page
    Page {
        /// Page number (1-indexed)
        number: u32,
        text: String,
    },
    /// Raw text of one DOCX paragraph, possibly empty
    Paragraph { text: String },
    /// One slide, or one text submission, split into lines
    Lines { lines: Vec<String> },
}

impl ChunkContent {
    /// Flatten to a single string; lines are joined with `\n`
    pub fn text(&self) -> String {
        match self {
            Self::Page { text, .. } | Self::Paragraph { text } => text.clone(),
            Self::Lines { lines } => lines.join("\n"),
        }
    }
}

/// A unit of extracted text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextChunk {
    /// Identifier shared by all chunks of one upload
    pub source_id: Uuid,
    /// Source type
    pub source: SourceKind,
    /// Uploaded filename (absent for pasted text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Position within the source (0-indexed)
    pub index: u32,
    /// Extracted content
    pub content: ChunkContent,
}

impl TextChunk {
    /// Create a new chunk
    pub fn new(
        source_id: Uuid,
        source: SourceKind,
        filename: Option<String>,
        index: u32,
        content: ChunkContent,
    ) -> Self {
        Self {
            source_id,
            source,
            filename,
            index,
            content,
        }
    }

    /// Text to hand to an embedding model
    pub fn text(&self) -> String {
        self.content.text()
    }

    /// Format source for display, e.g. `notes.pdf, Page 3`
    pub fn format_source(&self) -> String {
        let mut parts = vec![self
            .filename
            .clone()
            .unwrap_or_else(|| "pasted text".to_string())];

        match (&self.content, self.source) {
            (ChunkContent::Page { number, .. }, _) => parts.push(format!("Page {}", number)),
            (_, SourceKind::Docx) => parts.push(format!("Paragraph {}", self.index + 1)),
            (_, SourceKind::Pptx) => parts.push(format!("Slide {}", self.index + 1)),
            _ => {}
        }

        parts.join(", ")
    }
}

/// An uploaded file held in memory
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename as uploaded
    pub filename: String,
    /// Raw file bytes
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// Lowercased extension, empty when the name has none
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default()
    }
}
