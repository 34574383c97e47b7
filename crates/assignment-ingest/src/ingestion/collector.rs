//! Document collector: routes uploads to extractors and accumulates chunks

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tempfile::NamedTempFile;
use uuid::Uuid;

use super::parser::FileParser;
use super::text::split_lines;
use crate::config::CollectorConfig;
use crate::error::{Error, Result};
use crate::types::{
    BatchOutcome, ChunkContent, IngestError, IngestResponse, SourceKind, TextChunk, Upload,
};

/// One form submission
///
/// PDFs and DOCX files may be submitted in any number; a submission carries
/// at most one presentation and one block of pasted text.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub pdfs: Vec<Upload>,
    pub docx: Vec<Upload>,
    pub pptx: Option<Upload>,
    pub text: Option<String>,
}

impl SubmissionForm {
    pub fn is_empty(&self) -> bool {
        self.pdfs.is_empty()
            && self.docx.is_empty()
            && self.pptx.is_none()
            && self.text.as_deref().map_or(true, str::is_empty)
    }
}

/// Accumulates text chunks from heterogeneous uploads.
///
/// Chunks are kept in insertion order. Each handler processes its files one
/// at a time; a file that fails is reported and skipped, and nothing already
/// appended is rolled back.
pub struct DocumentCollector {
    pages: Vec<TextChunk>,
    temp_dir: PathBuf,
}

impl Default for DocumentCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCollector {
    /// Create a collector that stages uploads in the system temp directory
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Create from config
    pub fn with_config(config: &CollectorConfig) -> Self {
        Self {
            pages: Vec::new(),
            temp_dir: config
                .temp_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
        }
    }

    /// Directory used for staging uploads
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Chunks collected so far, in insertion order
    pub fn pages(&self) -> &[TextChunk] {
        &self.pages
    }

    /// Number of chunks collected so far
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Take ownership of the collected chunks
    pub fn into_pages(self) -> Vec<TextChunk> {
        self.pages
    }

    /// Chunks grouped by upload, each group in extraction order
    pub fn by_source(&self) -> BTreeMap<Uuid, Vec<&TextChunk>> {
        let mut groups: BTreeMap<Uuid, Vec<&TextChunk>> = BTreeMap::new();
        for chunk in &self.pages {
            groups.entry(chunk.source_id).or_default().push(chunk);
        }
        groups
    }

    /// Process a submission: PDFs, then DOCX files, then the presentation,
    /// then pasted text.
    pub fn ingest_documents(&mut self, form: SubmissionForm) -> IngestResponse {
        let start = Instant::now();
        let mut outcome = BatchOutcome::default();

        outcome.merge(self.handle_pdf_upload(&form.pdfs));
        outcome.merge(self.handle_docx_upload(&form.docx));
        if let Some(pptx) = &form.pptx {
            outcome.merge(self.handle_ppt_upload(pptx));
        }
        if let Some(text) = &form.text {
            outcome.merge(self.handle_text_input(text));
        }

        let response = IngestResponse {
            success: outcome.is_clean(),
            total_chunks: self.pages.len(),
            chunks_added: outcome.chunks_added,
            files_processed: outcome.files_processed,
            processing_time_ms: start.elapsed().as_millis() as u64,
            submitted_at: chrono::Utc::now(),
            errors: outcome.errors,
        };

        tracing::info!("{}", response.status_message());
        response
    }

    /// Stage each PDF in a temp file and append one chunk per page
    pub fn handle_pdf_upload(&mut self, files: &[Upload]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for upload in files {
            tracing::info!("Processing PDF: {} ({} bytes)", upload.filename, upload.data.len());

            let result = self.with_staged_copy(upload, |path| {
                FileParser::parse_pdf(path, &upload.filename)
            });

            match result {
                Ok(pages) => {
                    let source_id = Uuid::new_v4();
                    let added = pages.len();
                    for (index, page) in pages.into_iter().enumerate() {
                        self.push(
                            source_id,
                            SourceKind::Pdf,
                            Some(&upload.filename),
                            index,
                            ChunkContent::Page {
                                number: page.page_number,
                                text: page.content,
                            },
                        );
                    }
                    outcome.files_processed += 1;
                    outcome.chunks_added += added;
                }
                Err(e) => Self::record_failure(&mut outcome, upload, e),
            }
        }

        outcome
    }

    /// Parse each DOCX in memory and append one chunk per paragraph
    pub fn handle_docx_upload(&mut self, files: &[Upload]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for upload in files {
            tracing::info!("Processing DOCX: {} ({} bytes)", upload.filename, upload.data.len());

            match FileParser::parse_docx(&upload.data, &upload.filename) {
                Ok(paragraphs) => {
                    let source_id = Uuid::new_v4();
                    let added = paragraphs.len();
                    for (index, text) in paragraphs.into_iter().enumerate() {
                        self.push(
                            source_id,
                            SourceKind::Docx,
                            Some(&upload.filename),
                            index,
                            ChunkContent::Paragraph { text },
                        );
                    }
                    outcome.files_processed += 1;
                    outcome.chunks_added += added;
                }
                Err(e) => Self::record_failure(&mut outcome, upload, e),
            }
        }

        outcome
    }

    /// Stage a presentation in a temp file and append one chunk per slide
    pub fn handle_ppt_upload(&mut self, file: &Upload) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        tracing::info!("Processing PPTX: {} ({} bytes)", file.filename, file.data.len());

        match self.with_staged_copy(file, |path| FileParser::parse_pptx(path, &file.filename)) {
            Ok(slides) => {
                let source_id = Uuid::new_v4();
                let added = slides.len();
                for (index, lines) in slides.into_iter().enumerate() {
                    self.push(
                        source_id,
                        SourceKind::Pptx,
                        Some(&file.filename),
                        index,
                        ChunkContent::Lines { lines },
                    );
                }
                outcome.files_processed += 1;
                outcome.chunks_added += added;
            }
            Err(e) => Self::record_failure(&mut outcome, file, e),
        }

        outcome
    }

    /// Append pasted text as one chunk of lines; empty text is ignored
    pub fn handle_text_input(&mut self, text: &str) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        if text.is_empty() {
            return outcome;
        }

        self.push(
            Uuid::new_v4(),
            SourceKind::Text,
            None,
            0,
            ChunkContent::Lines {
                lines: split_lines(text),
            },
        );
        outcome.chunks_added = 1;
        outcome
    }

    fn push(
        &mut self,
        source_id: Uuid,
        source: SourceKind,
        filename: Option<&str>,
        index: usize,
        content: ChunkContent,
    ) {
        let chunk = TextChunk::new(
            source_id,
            source,
            filename.map(str::to_string),
            index as u32,
            content,
        );
        tracing::trace!("Collected {}", chunk.format_source());
        self.pages.push(chunk);
    }

    fn record_failure(outcome: &mut BatchOutcome, upload: &Upload, error: Error) {
        tracing::warn!("Error processing file {}: {}", upload.filename, error);
        outcome.errors.push(IngestError::new(&upload.filename, error));
    }

    /// Write the upload to `<stem>_<random>.<ext>` in the staging directory,
    /// run `f` on the path, and remove the file afterwards.
    ///
    /// The file is owned by a `NamedTempFile`, so it is also removed when `f`
    /// fails or panics.
    fn with_staged_copy<T>(
        &self,
        upload: &Upload,
        f: impl FnOnce(&Path) -> Result<T>,
    ) -> Result<T> {
        let staged = self.stage(upload)?;
        let result = f(staged.path());

        let path = staged.path().to_path_buf();
        if let Err(e) = staged.close() {
            tracing::warn!("Failed to remove temp file {}: {}", path.display(), e);
        }

        result
    }

    fn stage(&self, upload: &Upload) -> Result<NamedTempFile> {
        let path = Path::new(&upload.filename);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload");
        let suffix = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let mut staged = tempfile::Builder::new()
            .prefix(&format!("{}_", stem))
            .suffix(&suffix)
            .rand_bytes(16)
            .tempfile_in(&self.temp_dir)?;

        staged.write_all(&upload.data)?;
        staged.flush()?;

        tracing::debug!("Staged {} at {}", upload.filename, staged.path().display());
        Ok(staged)
    }
}
