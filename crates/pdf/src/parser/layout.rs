//! Text extraction and line/block assembly.
//!
//! Turns raw content-stream operators into the Span Stream consumed by
//! `restruct_core`: pages of blocks of lines of styled fragments, with
//! coordinates flipped to a top-left origin. All I/O sits behind the
//! [`PdfBackend`] trait, so every step here can be driven from tests.
//!
//! # Pipeline
//!
//! ```text
//! content ops  ->  TextSpan[]  ->  TextLine[]  ->  TextBlock[]  ->  Page
//!   (per page)      extract         group_spans      group_lines     build_page
//! ```

use restruct_core::{Block, Fragment, Line, Page, Rect};

use super::backend::{get_number_from_value, BackendFontInfo, MediaBox, PageId, PdfBackend, PdfValue};
use super::cleanup::clean_fragment_text;
use crate::PdfError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A single run of text at a specific position, in PDF user space
/// (origin bottom-left, `y` is the baseline).
#[derive(Debug, Clone)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_name: String,
}

/// Spans sharing (approximately) one baseline, sorted left to right.
///
/// Adjacent runs in the same font are merged, so each span here becomes one
/// [`Fragment`]. A change of font or size keeps runs apart.
#[derive(Debug, Clone, Default)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
    pub y: f32,
    /// Largest font size on the line.
    pub font_size: f32,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Consecutive lines without a paragraph-sized gap between them.
#[derive(Debug, Clone, Default)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Two spans whose baselines differ by less than this share a line.
const Y_TOLERANCE: f32 = 1.0;

/// Approximate glyph width as a fraction of font size; no glyph metrics are read.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Minimum horizontal gap (points) that counts as a word break.
const MIN_WORD_GAP: f32 = 1.5;

/// A baseline distance larger than this multiple of the font size starts a new block.
const BLOCK_GAP_FACTOR: f32 = 1.4;

/// Sizes closer than this are the same size.
const FONT_SIZE_EPSILON: f32 = 0.5;

/// Ascender and descender as fractions of the font size, for fragment boxes.
const ASCENT_RATIO: f32 = 0.8;
const DESCENT_RATIO: f32 = 0.2;

// ---------------------------------------------------------------------------
// Internal: PDF text-state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct TextState {
    /// `Tf` resource key (`/F1`), not the base font name.
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    /// [a, b, c, d, tx, ty]
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5]
    }

    /// Rendered size: `font_size * sqrt(b^2 + d^2)`.
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    /// Width of one glyph in text space.
    fn glyph_advance(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    /// Rendered width of `text` in user space.
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.glyph_advance() * self.text_matrix[0].abs()
    }

    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Move past `text` after it has been shown.
    fn advance_after_show(&mut self, text: &str) {
        let dx: f32 = text
            .chars()
            .map(|ch| {
                let extra = if ch == ' ' { self.word_spacing } else { 0.0 };
                self.glyph_advance() + self.char_spacing + extra
            })
            .sum();
        self.advance_x(dx);
    }

    /// `Td`: translate the line matrix and reset the text matrix to it.
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }
}

fn number_operand(operands: &[PdfValue], index: usize) -> Option<f32> {
    operands.get(index).and_then(get_number_from_value)
}

fn decode_string(val: &PdfValue, backend: &dyn PdfBackend, page_id: PageId, font_key: &[u8]) -> String {
    match val {
        PdfValue::Str(bytes) => backend.decode_text(page_id, font_key, bytes),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Span extraction
// ---------------------------------------------------------------------------

/// Walk one page's content stream and collect its text runs.
///
/// | Operator | Action |
/// |----------|--------|
/// | `BT`     | reset matrices |
/// | `Tf`     | set font and size |
/// | `Tm`     | set text matrix |
/// | `Td` `TD` `T*` `TL` | line positioning |
/// | `Tc` `Tw` `Tz` `Ts` | spacing, scaling, rise |
/// | `Tj` `TJ` `'` `"`   | show text |
///
/// The current transformation matrix is ignored; text placed through `cm`
/// lands at its text-space position.
pub fn extract_page_spans(backend: &dyn PdfBackend, page_id: PageId) -> Result<Vec<TextSpan>, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    let fonts = backend.page_fonts(page_id).unwrap_or_else(|e| {
        log::warn!("page {page_id:?}: {e}; continuing without font resources");
        Vec::new()
    });

    let mut state = TextState::default();
    let mut spans: Vec<TextSpan> = Vec::new();

    for op in &ops {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            "Tf" => handle_tf(operands, &fonts, &mut state),
            "Tm" => {
                let vals: Vec<f32> = operands.iter().take(6).filter_map(get_number_from_value).collect();
                if let [a, b, c, d, e, f] = vals[..] {
                    state.text_matrix = [a, b, c, d, e, f];
                    state.line_matrix = state.text_matrix;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (number_operand(operands, 0), number_operand(operands, 1)) {
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.translate_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "TL" => {
                if let Some(v) = number_operand(operands, 0) {
                    state.leading = v;
                }
            }
            "Tc" => {
                if let Some(v) = number_operand(operands, 0) {
                    state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = number_operand(operands, 0) {
                    state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = number_operand(operands, 0) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = number_operand(operands, 0) {
                    state.text_rise = v;
                }
            }
            "Tj" => {
                if let Some(first) = operands.first() {
                    emit_show_string(first, backend, page_id, &mut state, &mut spans);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = operands.first() {
                    handle_tj_array(arr, backend, page_id, &mut state, &mut spans);
                }
            }
            "'" => {
                state.next_line();
                if let Some(first) = operands.first() {
                    emit_show_string(first, backend, page_id, &mut state, &mut spans);
                }
            }
            "\"" => {
                if operands.len() >= 3 {
                    if let Some(aw) = number_operand(operands, 0) {
                        state.word_spacing = aw;
                    }
                    if let Some(ac) = number_operand(operands, 1) {
                        state.char_spacing = ac;
                    }
                    state.next_line();
                    emit_show_string(&operands[2], backend, page_id, &mut state, &mut spans);
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

fn handle_tf(operands: &[PdfValue], fonts: &[BackendFontInfo], state: &mut TextState) {
    let key = match operands.first() {
        Some(PdfValue::Name(n)) | Some(PdfValue::Str(n)) => n.clone(),
        _ => return,
    };
    let size = number_operand(operands, 1).unwrap_or(0.0);

    state.font_name = fonts
        .iter()
        .find(|info| info.name == key)
        .and_then(|info| info.base_font.clone())
        .unwrap_or_else(|| String::from_utf8_lossy(&key).into_owned());
    state.font_key = key;
    state.font_size = size;
}

fn push_span(text: &str, x: f32, y: f32, state: &TextState, spans: &mut Vec<TextSpan>) {
    spans.push(TextSpan {
        text: text.to_string(),
        x,
        y,
        width: state.text_width(text),
        font_size: state.effective_font_size(),
        font_name: state.font_name.clone(),
    });
}

fn emit_show_string(
    operand: &PdfValue,
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    spans: &mut Vec<TextSpan>,
) {
    let text = decode_string(operand, backend, page_id, &state.font_key);
    if text.is_empty() {
        return;
    }
    push_span(&text, state.x(), state.y() + state.text_rise, state, spans);
    state.advance_after_show(&text);
}

/// `TJ`: strings interleaved with kerning adjustments in thousandths of a
/// text-space unit. A large negative adjustment reads as a word space.
fn handle_tj_array(
    arr: &[PdfValue],
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    spans: &mut Vec<TextSpan>,
) {
    let mut buf = String::new();
    let mut span_x = state.x();
    let span_y = state.y() + state.text_rise;

    for elem in arr {
        if let PdfValue::Str(_) = elem {
            let piece = decode_string(elem, backend, page_id, &state.font_key);
            if buf.is_empty() {
                span_x = state.x();
            }
            buf.push_str(&piece);
            state.advance_after_show(&piece);
        } else if let Some(adj) = get_number_from_value(elem) {
            let dx = -adj / 1000.0 * state.font_size * state.horiz_scale;
            if dx > state.glyph_advance() * 0.3 && !buf.is_empty() {
                buf.push(' ');
            }
            state.advance_x(dx);
        }
    }

    let text = buf.trim_end();
    if !text.is_empty() {
        push_span(text, span_x, span_y, state, spans);
    }
}

// ---------------------------------------------------------------------------
// Lines and blocks
// ---------------------------------------------------------------------------

/// Group spans into lines, top of the page first.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in spans {
        let same_line = current.first().is_some_and(|first| (span.y - first.y).abs() <= Y_TOLERANCE);
        if !same_line && !current.is_empty() {
            lines.push(assemble_line(std::mem::take(&mut current)));
        }
        current.push(span);
    }
    if !current.is_empty() {
        lines.push(assemble_line(current));
    }

    lines
}

/// Sort a line's spans left to right and merge same-font neighbours.
///
/// When two runs in different fonts are separated by a visible gap, the
/// earlier one gets a trailing space so that concatenated fragment texts
/// still read as words.
fn assemble_line(mut spans: Vec<TextSpan>) -> TextLine {
    spans.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(prev) = merged.last_mut() {
            let gap = span.x - (prev.x + prev.width);
            let same_font =
                prev.font_name == span.font_name && (prev.font_size - span.font_size).abs() < FONT_SIZE_EPSILON;

            if same_font && gap > -prev.font_size && gap < prev.font_size * 2.0 {
                if gap >= MIN_WORD_GAP && !prev.text.ends_with(' ') && !span.text.starts_with(' ') {
                    prev.text.push(' ');
                }
                prev.text.push_str(&span.text);
                prev.width = (span.x + span.width) - prev.x;
                continue;
            }

            if gap >= MIN_WORD_GAP && !prev.text.ends_with(' ') {
                prev.text.push(' ');
            }
        }
        merged.push(span);
    }

    TextLine {
        y: merged.first().map_or(0.0, |s| s.y),
        font_size: merged.iter().map(|s| s.font_size).fold(0.0, f32::max),
        spans: merged,
    }
}

/// Split lines into blocks wherever the baseline distance exceeds
/// [`BLOCK_GAP_FACTOR`] times the larger of the two font sizes.
pub fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current = TextBlock::default();

    for line in lines {
        if let Some(prev) = current.lines.last() {
            let threshold = prev.font_size.max(line.font_size) * BLOCK_GAP_FACTOR;
            if (prev.y - line.y).abs() > threshold {
                blocks.push(std::mem::take(&mut current));
            }
        }
        current.lines.push(line);
    }
    if !current.lines.is_empty() {
        blocks.push(current);
    }

    blocks
}

// ---------------------------------------------------------------------------
// Conversion to the Span Stream
// ---------------------------------------------------------------------------

/// Flip a user-space rectangle into top-left page space.
pub fn flip_rect(rect: &MediaBox, media: &MediaBox) -> Rect {
    Rect::new(
        rect.llx - media.llx,
        media.ury - rect.ury,
        rect.urx - media.llx,
        media.ury - rect.lly,
    )
}

fn span_rect(span: &TextSpan, media: &MediaBox) -> Rect {
    flip_rect(
        &MediaBox {
            llx: span.x,
            lly: span.y - span.font_size * DESCENT_RATIO,
            urx: span.x + span.width,
            ury: span.y + span.font_size * ASCENT_RATIO,
        },
        media,
    )
}

/// Assemble a [`Page`] from laid-out blocks. Fragments whose text is empty
/// after cleanup are dropped, as are lines and blocks left empty by that.
pub fn build_page(number: usize, media: &MediaBox, blocks: Vec<TextBlock>, links: &[MediaBox]) -> Page {
    let mut page = Page::new(number, media.height());

    for block in blocks {
        let lines: Vec<Line> = block
            .lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .filter_map(|span| {
                        let text = clean_fragment_text(&span.text);
                        (!text.is_empty()).then(|| Fragment::new(text, span.font_size, span_rect(span, media)))
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|fragments| !fragments.is_empty())
            .map(Line::new)
            .collect();

        if !lines.is_empty() {
            page = page.with_block(Block::from_lines(lines));
        }
    }

    for link in links {
        page = page.with_link(flip_rect(link, media));
    }

    page
}

/// Full layout of one page.
pub fn layout_page(backend: &dyn PdfBackend, number: usize, page_id: PageId) -> Result<Page, PdfError> {
    let spans = extract_page_spans(backend, page_id)?;
    let media = backend.media_box(page_id)?;
    let blocks = group_lines_into_blocks(group_spans_into_lines(spans));
    let links = backend.link_rects(page_id);
    let page = build_page(number, &media, blocks, &links);
    log::debug!(
        "page {number}: {} blocks, {} links",
        page.blocks.len(),
        page.links.len()
    );
    Ok(page)
}
