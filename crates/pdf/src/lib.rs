//! PDF front end for restruct.
//!
//! Decodes a PDF with `lopdf` and lays its text out as the Span Stream that
//! `restruct_core` consumes: pages of blocks of lines of styled fragments,
//! together with each page's link hot zones and the document outline.

use serde::Serialize;
use thiserror::Error;

use parser::backend::{LopdfBackend, OutlineItem, PdfBackend};
use restruct_core::{Document, TocEntry};

#[cfg(test)]
mod fixtures;
pub mod parser;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
}

/// Document-level facts that do not need a layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub page_count: usize,
    pub outline: Vec<TocEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Lay out every page of the PDF.
pub fn load_document(bytes: &[u8]) -> Result<Document, PdfError> {
    load_document_with(bytes, |_| true)
}

/// Lay out the pages for which `include(page_number)` holds; the rest are
/// never decoded. The outline is always read in full.
pub fn load_document_with(bytes: &[u8], include: impl Fn(usize) -> bool) -> Result<Document, PdfError> {
    let backend = LopdfBackend::load_bytes(bytes)?;

    let mut pages = Vec::new();
    for (&number, &page_id) in &backend.pages() {
        let number = number as usize;
        if !include(number) {
            continue;
        }
        pages.push(parser::layout::layout_page(&backend, number, page_id)?);
    }

    let toc = outline_to_toc(backend.outline());
    log::info!(
        "laid out {} of {} pages, outline has {} entries",
        pages.len(),
        backend.page_count(),
        toc.len()
    );

    Ok(Document::new(pages).with_toc(toc))
}

/// Metadata and outline without laying out any page.
pub fn info(bytes: &[u8]) -> Result<DocumentInfo, PdfError> {
    let backend = LopdfBackend::load_bytes(bytes)?;
    Ok(DocumentInfo {
        title: backend.info_entry("Title"),
        author: backend.info_entry("Author"),
        creator: backend.info_entry("Creator"),
        page_count: backend.page_count(),
        outline: outline_to_toc(backend.outline()),
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn outline_to_toc(items: Vec<OutlineItem>) -> Vec<TocEntry> {
    items
        .into_iter()
        .map(|item| TocEntry {
            level: item.level,
            title: parser::cleanup::clean_fragment_text(&item.title).trim().to_string(),
            page: item.page,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{build_pdf, FixtureOutline, FixturePage};
    use pretty_assertions::assert_eq;
    use restruct_core::{extract_sections, ExtractOptions};

    const PAGE_ONE: &str = "BT /F2 14 Tf 72 700 Td (1 Introduction) Tj \
                            /F1 11 Tf 0 -16 Td (Intro body text.) Tj ET";
    const PAGE_TWO: &str = "BT /F2 14 Tf 72 700 Td (2 Methods) Tj \
                            /F1 11 Tf 0 -16 Td (See the appendix.) Tj ET";

    fn two_page_pdf() -> Vec<u8> {
        build_pdf(
            &[
                FixturePage {
                    content: PAGE_ONE,
                    links: &[],
                },
                FixturePage {
                    content: PAGE_TWO,
                    links: &[[72, 80, 300, 100]],
                },
            ],
            &[
                FixtureOutline {
                    title: "1 Introduction",
                    page: 0,
                    children: &[],
                },
                FixtureOutline {
                    title: "2 Methods",
                    page: 1,
                    children: &[],
                },
            ],
        )
    }

    #[test]
    fn test_info() {
        let info = info(&two_page_pdf()).unwrap();
        assert_eq!(info.title.as_deref(), Some("Fixture"));
        assert_eq!(info.author.as_deref(), Some("QA"));
        assert_eq!(info.creator, None);
        assert_eq!(info.page_count, 2);
        assert_eq!(
            info.outline,
            vec![
                TocEntry {
                    level: 1,
                    title: "1 Introduction".to_string(),
                    page: Some(1),
                },
                TocEntry {
                    level: 1,
                    title: "2 Methods".to_string(),
                    page: Some(2),
                },
            ]
        );
    }

    #[test]
    fn test_info_rejects_empty_input() {
        assert!(matches!(info(&[]), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_load_document() {
        let doc = load_document(&two_page_pdf()).unwrap();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.toc.len(), 2);

        let first = &doc.pages[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.blocks.len(), 1);
        assert_eq!(first.blocks[0].lines[0].text(), "1 Introduction");
        assert_eq!(first.blocks[0].lines[1].text(), "Intro body text.");
        assert!(first.links.is_empty());

        // Link rect [72 80 300 100] flipped on a 792pt page.
        assert_eq!(doc.pages[1].links[0].y0, 692.0);
        assert_eq!(doc.pages[1].links[0].y1, 712.0);
    }

    #[test]
    fn test_load_document_page_filter() {
        let doc = load_document_with(&two_page_pdf(), |page| page == 2).unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].number, 2);
        assert_eq!(doc.toc.len(), 2);
    }

    #[test]
    fn test_pdf_to_sections() {
        let doc = load_document(&two_page_pdf()).unwrap();
        let sections = extract_sections(&doc, ExtractOptions::default()).unwrap();

        let summary: Vec<_> = sections
            .iter()
            .map(|s| (s.number.as_str(), s.title.as_str(), s.page, s.content.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1", "Introduction", 1, "Intro body text.\n"),
                ("2", "Methods", 2, "See the appendix.\n"),
            ]
        );
    }
}
