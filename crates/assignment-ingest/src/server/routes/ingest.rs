//! Form submission endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::ingestion::{FileParser, SubmissionForm};
use crate::server::state::AppState;
use crate::types::{IngestError, IngestResponse, SourceKind, Upload};

/// POST /api/ingest - submit the document form
///
/// Multipart fields: `pdf` and `docx` (repeatable), `pptx` and `text` (at
/// most one each). Files whose extension does not match their field, and
/// extra presentations or text blocks, are reported back as errors.
pub async fn submit_form(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let mut form = SubmissionForm::default();
    let mut rejected = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Internal(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "text" {
            let text = field
                .text()
                .await
                .map_err(|e| Error::Internal(format!("Failed to read text field: {}", e)))?;
            if form.text.is_some() {
                rejected.push(IngestError::new("text", "Only one text block per submission"));
            } else {
                form.text = Some(text);
            }
            continue;
        }

        let expected = match name.as_str() {
            "pdf" => SourceKind::Pdf,
            "docx" => SourceKind::Docx,
            "pptx" => SourceKind::Pptx,
            other => {
                tracing::debug!("Ignoring unknown form field '{}'", other);
                continue;
            }
        };

        let filename = field.file_name().unwrap_or("").to_string();
        let data = match field.bytes().await {
            Ok(d) => d,
            Err(e) => {
                rejected.push(IngestError::new(&filename, format!("Failed to read file: {}", e)));
                continue;
            }
        };

        // Browsers send an empty part for an untouched file input
        if filename.is_empty() && data.is_empty() {
            continue;
        }

        let upload = Upload::new(filename, data);
        match FileParser::detect(&upload.filename) {
            Some(kind) if kind == expected => {}
            Some(_) => {
                rejected.push(IngestError::new(
                    &upload.filename,
                    format!("Expected a {} file", expected.display_name()),
                ));
                continue;
            }
            None => {
                rejected.push(IngestError::new(
                    &upload.filename,
                    Error::UnsupportedFileType(upload.extension()),
                ));
                continue;
            }
        }

        match expected {
            SourceKind::Pdf => form.pdfs.push(upload),
            SourceKind::Docx => form.docx.push(upload),
            SourceKind::Pptx if form.pptx.is_some() => rejected.push(IngestError::new(
                &upload.filename,
                "Only one presentation per submission",
            )),
            SourceKind::Pptx => form.pptx = Some(upload),
            SourceKind::Text => {}
        }
    }

    let mut response = state.submit(form).await?;

    if !rejected.is_empty() {
        for error in &rejected {
            tracing::warn!("Rejected form item {}: {}", error.filename, error.error);
        }
        response.success = false;
        rejected.append(&mut response.errors);
        response.errors = rejected;
    }

    Ok(Json(response))
}
