mod common;

use assignment_ingest::config::CollectorConfig;
use assignment_ingest::{ChunkContent, DocumentCollector, SourceKind, SubmissionForm, Upload};
use tempfile::TempDir;

use common::{dir_entries, make_docx, make_pdf, make_pptx};

fn collector_in(dir: &TempDir) -> DocumentCollector {
    DocumentCollector::with_config(&CollectorConfig {
        temp_dir: Some(dir.path().to_path_buf()),
    })
}

fn lines(values: &[&str]) -> ChunkContent {
    ChunkContent::Lines {
        lines: values.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn test_pdf_pages_from_every_file_in_order() {
    let dir = TempDir::new().unwrap();
    let mut collector = collector_in(&dir);

    let files = vec![
        Upload::new("week1.pdf", make_pdf(&["Cells", "Mitosis"])),
        Upload::new("week2.pdf", make_pdf(&["Genetics"])),
    ];
    let outcome = collector.handle_pdf_upload(&files);

    assert!(outcome.is_clean(), "{:?}", outcome.errors);
    assert_eq!(outcome.files_processed, 2);
    assert_eq!(outcome.chunks_added, 3);

    let pages = collector.pages();
    let summary: Vec<(&str, u32)> = pages
        .iter()
        .map(|c| match &c.content {
            ChunkContent::Page { number, .. } => (c.filename.as_deref().unwrap(), *number),
            other => panic!("unexpected content {:?}", other),
        })
        .collect();
    assert_eq!(summary, vec![("week1.pdf", 1), ("week1.pdf", 2), ("week2.pdf", 1)]);

    assert!(pages[0].text().contains("Cells"));
    assert!(pages[1].text().contains("Mitosis"));
    assert!(pages[2].text().contains("Genetics"));
    assert_eq!(pages[0].source_id, pages[1].source_id);
    assert_ne!(pages[0].source_id, pages[2].source_id);
    assert_eq!(pages[1].index, 1);

    assert_eq!(dir_entries(dir.path()), 0);
}

#[test]
fn test_bad_pdf_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let mut collector = collector_in(&dir);

    let files = vec![
        Upload::new("broken.pdf", b"%PDF-1.4 truncated".to_vec()),
        Upload::new("good.pdf", make_pdf(&["Still here"])),
    ];
    let outcome = collector.handle_pdf_upload(&files);

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].filename, "broken.pdf");
    assert_eq!(outcome.files_processed, 1);
    assert_eq!(collector.len(), 1);
    assert_eq!(collector.pages()[0].filename.as_deref(), Some("good.pdf"));
    assert_eq!(dir_entries(dir.path()), 0);
}

#[test]
fn test_docx_one_chunk_per_paragraph() {
    let mut collector = DocumentCollector::new();
    let data = make_docx(&["Introduction", "", "Body text", "Conclusion"]);

    let outcome = collector.handle_docx_upload(&[Upload::new("essay.docx", data)]);

    assert!(outcome.is_clean(), "{:?}", outcome.errors);
    assert_eq!(outcome.chunks_added, 4);
    let texts: Vec<String> = collector.pages().iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["Introduction", "", "Body text", "Conclusion"]);
    assert!(collector.pages().iter().all(|c| c.source == SourceKind::Docx));
    assert_eq!(
        collector.pages()[2].content,
        ChunkContent::Paragraph {
            text: "Body text".to_string()
        }
    );
}

#[test]
fn test_docx_failures_are_isolated() {
    let mut collector = DocumentCollector::new();
    let files = vec![
        Upload::new("notes.docx", make_docx(&["One"])),
        Upload::new("corrupt.docx", b"PK\x03\x04 nope".to_vec()),
        Upload::new("more.docx", make_docx(&["Two", "Three"])),
    ];

    let outcome = collector.handle_docx_upload(&files);

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].filename, "corrupt.docx");
    assert_eq!(collector.len(), 3);
}

#[test]
fn test_pptx_one_chunk_per_slide() {
    let dir = TempDir::new().unwrap();
    let mut collector = collector_in(&dir);

    let slides = vec![
        vec![vec!["Photosynthesis"], vec!["Light reactions", "Calvin cycle"]],
        vec![],
        vec![vec!["Summary"]],
    ];
    let data = make_pptx(&slides, &[0, 1, 2]);

    let outcome = collector.handle_ppt_upload(&Upload::new("biology.pptx", data));

    assert!(outcome.is_clean(), "{:?}", outcome.errors);
    assert_eq!(outcome.chunks_added, 3);

    let contents: Vec<&ChunkContent> = collector.pages().iter().map(|c| &c.content).collect();
    assert_eq!(
        contents,
        vec![
            &lines(&["Photosynthesis Light reactions", "Calvin cycle"]),
            &lines(&[]),
            &lines(&["Summary"]),
        ]
    );
    assert_eq!(dir_entries(dir.path()), 0);
}

#[test]
fn test_pptx_follows_presentation_order() {
    let dir = TempDir::new().unwrap();
    let mut collector = collector_in(&dir);

    let slides = vec![vec![vec!["First file"]], vec![vec!["Second file"]]];
    let data = make_pptx(&slides, &[1, 0]);

    collector.handle_ppt_upload(&Upload::new("reordered.pptx", data));

    let texts: Vec<String> = collector.pages().iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["Second file", "First file"]);
}

#[test]
fn test_corrupt_pptx_is_reported_and_cleaned_up() {
    let dir = TempDir::new().unwrap();
    let mut collector = collector_in(&dir);

    let outcome = collector.handle_ppt_upload(&Upload::new("deck.pptx", b"not a zip".to_vec()));

    assert_eq!(outcome.errors.len(), 1);
    assert!(collector.is_empty());
    assert_eq!(dir_entries(dir.path()), 0);
}

#[test]
fn test_text_input() {
    let mut collector = DocumentCollector::new();
    collector.handle_text_input("a\nb");

    assert_eq!(collector.len(), 1);
    assert_eq!(collector.pages()[0].content, lines(&["a", "b"]));
}

#[test]
fn test_submission_keeps_handler_order() {
    let dir = TempDir::new().unwrap();
    let mut collector = collector_in(&dir);

    let form = SubmissionForm {
        pdfs: vec![Upload::new("reading.pdf", make_pdf(&["Page one"]))],
        docx: vec![Upload::new("prompt.docx", make_docx(&["Write an essay"]))],
        pptx: Some(Upload::new("slides.pptx", make_pptx(&[vec![vec!["Slide"]]], &[0]))),
        text: Some("extra\nnotes".to_string()),
    };

    let response = collector.ingest_documents(form);

    assert!(response.success, "{:?}", response.errors);
    assert_eq!(response.total_chunks, 4);
    assert_eq!(response.chunks_added, 4);
    assert_eq!(response.files_processed, 3);
    assert_eq!(response.status_message(), "Total pages processed: 4");

    let kinds: Vec<SourceKind> = collector.pages().iter().map(|c| c.source).collect();
    assert_eq!(
        kinds,
        vec![SourceKind::Pdf, SourceKind::Docx, SourceKind::Pptx, SourceKind::Text]
    );
    assert_eq!(collector.by_source().len(), 4);

    // Totals are cumulative across submissions
    let response = collector.ingest_documents(SubmissionForm {
        text: Some("more".to_string()),
        ..Default::default()
    });
    assert_eq!(response.total_chunks, 5);
    assert_eq!(response.chunks_added, 1);
}
