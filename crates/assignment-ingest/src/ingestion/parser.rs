//! Format-specific text extractors

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::text::{cleanup_pdf_text, split_lines};
use crate::error::{Error, Result};
use crate::types::SourceKind;

/// Text of one PDF page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text content of the page
    pub content: String,
}

/// Stateless extractors, one per supported format
pub struct FileParser;

impl FileParser {
    /// Detect the source kind of a file from its name
    pub fn detect(filename: &str) -> Option<SourceKind> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        SourceKind::from_extension(extension)
    }

    /// Extract PDF text page by page.
    ///
    /// Uses lopdf's per-page extraction. When lopdf can open the file but
    /// can't decode a page's text, the document is re-read with pdf-extract,
    /// still one entry per page.
    pub fn parse_pdf(path: &Path, filename: &str) -> Result<Vec<PageContent>> {
        Self::parse_pdf_with(path, filename, |doc, page_number| {
            doc.extract_text(&[page_number])
        })
    }

    fn parse_pdf_with(
        path: &Path,
        filename: &str,
        page_text: impl Fn(&lopdf::Document, u32) -> lopdf::Result<String>,
    ) -> Result<Vec<PageContent>> {
        let doc = lopdf::Document::load(path)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut pages = Vec::with_capacity(page_numbers.len());

        for page_number in page_numbers {
            match page_text(&doc, page_number) {
                Ok(text) => pages.push(PageContent {
                    page_number,
                    content: cleanup_pdf_text(text.trim_end()),
                }),
                Err(e) => {
                    tracing::warn!(
                        "lopdf could not extract page {} of {}: {}, trying fallback",
                        page_number,
                        filename,
                        e
                    );
                    return Self::parse_pdf_fallback(path, filename);
                }
            }
        }

        tracing::debug!("Extracted {} pages from {}", pages.len(), filename);
        Ok(pages)
    }

    /// Per-page extraction with pdf-extract
    fn parse_pdf_fallback(path: &Path, filename: &str) -> Result<Vec<PageContent>> {
        let texts = pdf_extract::extract_text_by_pages(path)
            .map_err(|e| Error::file_parse(filename, format!("Failed to extract text: {}", e)))?;

        tracing::debug!("Fallback extracted {} pages from {}", texts.len(), filename);

        Ok(texts
            .iter()
            .zip(1u32..)
            .map(|(text, page_number)| PageContent {
                page_number,
                content: cleanup_pdf_text(text.trim()),
            })
            .collect())
    }

    /// Extract the raw text of every top-level body paragraph.
    ///
    /// Empty paragraphs are kept so the result has one entry per paragraph.
    /// Paragraphs inside tables are not body paragraphs and are skipped.
    pub fn parse_docx(data: &[u8], filename: &str) -> Result<Vec<String>> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut paragraphs = Vec::new();
        for child in &doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut text = String::new();
                collect_paragraph_text(&p.children, &mut text);
                paragraphs.push(text);
            }
        }

        Ok(paragraphs)
    }

    /// Extract slide text from a PowerPoint file on disk.
    ///
    /// Each slide yields the lines of its top-level text shapes joined by a
    /// space. Slides without text yield an empty list.
    pub fn parse_pptx(path: &Path, filename: &str) -> Result<Vec<Vec<String>>> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let slide_names = match presentation_slide_order(&mut archive) {
            Some(names) => names,
            None => {
                tracing::debug!("No slide list in {}, ordering slides by file name", filename);
                numbered_slide_names(&archive)
            }
        };

        let mut slides = Vec::with_capacity(slide_names.len());
        for slide_name in slide_names {
            let xml = read_entry(&mut archive, &slide_name).map_err(|e| {
                Error::file_parse(filename, format!("Failed to read {}: {}", slide_name, e))
            })?;
            let shapes = extract_shape_texts(&xml)
                .map_err(|e| Error::file_parse(filename, format!("{}: {}", slide_name, e)))?;
            slides.push(split_lines(&shapes.join(" ")));
        }

        Ok(slides)
    }
}

/// Append the text of a paragraph's runs and hyperlinks
fn collect_paragraph_text(children: &[docx_rs::ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        docx_rs::RunChild::Text(t) => out.push_str(&t.text),
                        docx_rs::RunChild::Tab(_) => out.push('\t'),
                        docx_rs::RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            docx_rs::ParagraphChild::Hyperlink(link) => {
                collect_paragraph_text(&link.children, out);
            }
            _ => {}
        }
    }
}

fn read_entry<R: Read + Seek>(archive: &mut zip::ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| Error::internal(format!("missing archive entry {}: {}", name, e)))?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Slide part names in presentation order, from `ppt/presentation.xml`
fn presentation_slide_order<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Option<Vec<String>> {
    let presentation = read_entry(archive, "ppt/presentation.xml").ok()?;
    let rels = read_entry(archive, "ppt/_rels/presentation.xml.rels").ok()?;

    let targets = relationship_targets(&rels)?;
    let ids = slide_relationship_ids(&presentation)?;

    let names: Vec<String> = ids
        .iter()
        .filter_map(|id| targets.get(id))
        .map(|target| resolve_part_name("ppt", target))
        .filter(|name| archive.index_for_name(name).is_some())
        .collect();

    if names.len() == ids.len() {
        Some(names)
    } else {
        None
    }
}

/// Relationship id -> target from a `.rels` part
fn relationship_targets(xml: &str) -> Option<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                let id = attribute(&e, b"Id", false);
                let target = attribute(&e, b"Target", false);
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
    }

    Some(targets)
}

/// `r:id` values of `p:sldId` entries, in order
fn slide_relationship_ids(xml: &str) -> Option<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sldId" => {
                if let Some(id) = attribute(&e, b"id", true) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
    }

    Some(ids)
}

/// Look up an attribute by local name, optionally requiring a namespace prefix
fn attribute(e: &BytesStart<'_>, local: &[u8], prefixed: bool) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if attr.key.local_name().as_ref() == local && attr.key.prefix().is_some() == prefixed {
            attr.unescape_value().ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}

/// Resolve a relationship target against the directory of its source part
fn resolve_part_name(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// `ppt/slides/slideN.xml` entries sorted by N
fn numbered_slide_names<R: Read + Seek>(archive: &zip::ZipArchive<R>) -> Vec<String> {
    let mut slide_names: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();

    slide_names.sort();
    slide_names.into_iter().map(|(_, name)| name).collect()
}

/// Text of each top-level shape on a slide.
///
/// A shape's text is its paragraphs joined by `\n`; `a:br` becomes a
/// vertical tab so the line split still breaks on it. Grouped shapes,
/// pictures and graphic frames (tables, charts) carry no text of their own.
fn extract_shape_texts(xml: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut shapes = Vec::new();
    // Depth of the open top-level shape, with its paragraphs so far
    let mut shape: Option<(usize, Vec<String>)> = None;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"sp" if shape.is_none()
                        && stack.last().map(Vec::as_slice) == Some(b"spTree".as_slice()) =>
                    {
                        shape = Some((stack.len(), Vec::new()));
                    }
                    b"p" => {
                        if let Some((_, paragraphs)) = shape.as_mut() {
                            paragraphs.push(String::new());
                        }
                    }
                    b"t" if shape.is_some() => in_text = true,
                    _ => {}
                }
                stack.push(name);
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some((_, paragraphs)) = shape.as_mut() {
                        paragraphs.push(String::new());
                    }
                }
                b"br" => {
                    if let Some(paragraph) = shape.as_mut().and_then(|(_, p)| p.last_mut()) {
                        paragraph.push('\u{0b}');
                    }
                }
                b"sp" if shape.is_none()
                    && stack.last().map(Vec::as_slice) == Some(b"spTree".as_slice()) =>
                {
                    shapes.push(String::new());
                }
                _ => {}
            },
            Event::Text(e) if in_text => {
                if let Some(paragraph) = shape.as_mut().and_then(|(_, p)| p.last_mut()) {
                    paragraph.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) if in_text => {
                if let Some(paragraph) = shape.as_mut().and_then(|(_, p)| p.last_mut()) {
                    paragraph.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                let name = stack.pop().unwrap_or_default();
                if name == b"t" {
                    in_text = false;
                }
                if name == b"sp" {
                    if let Some((depth, _)) = &shape {
                        if *depth == stack.len() {
                            if let Some((_, paragraphs)) = shape.take() {
                                shapes.push(paragraphs.join("\n"));
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}
