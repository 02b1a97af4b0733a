use std::path::Path;

use restruct_core::{Document, PageRange};

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    /// A serialized [`Document`].
    Spans,
}

impl InputKind {
    /// `--spans`, or a `.json` extension, selects a Span Stream.
    pub fn detect(path: &Path, spans_flag: bool) -> Self {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if spans_flag || is_json {
            InputKind::Spans
        } else {
            InputKind::Pdf
        }
    }
}

/// Read the input document. PDF pages outside `pages` are not laid out.
pub fn load_document(path: &Path, kind: InputKind, pages: PageRange) -> Result<Document> {
    let bytes = std::fs::read(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;

    let doc = match kind {
        InputKind::Spans => serde_json::from_slice(&bytes)
            .wrap_err_with(|| format!("{} is not a valid span stream", path.display()))?,
        InputKind::Pdf => pdf::load_document_with(&bytes, |page| pages.contains(page))
            .wrap_err_with(|| format!("failed to extract text from {}", path.display()))?,
    };

    log::debug!("{}: {} pages loaded", path.display(), doc.pages.len());
    Ok(doc)
}
