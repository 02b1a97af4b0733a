use serde::{Deserialize, Serialize};

use crate::toc::TocEntry;

// ---------------------------------------------------------------------------
// Span Stream
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle in page space, origin at the top-left corner,
/// `y` growing downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Rect { x0, y0, x1, y1 }
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Whether the two rectangles share a region of non-zero area.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A minimal styled run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub font_size: f32,
    pub bbox: Rect,
}

impl Fragment {
    pub fn new(text: impl Into<String>, font_size: f32, bbox: Rect) -> Self {
        Fragment {
            text: text.into(),
            font_size,
            bbox,
        }
    }
}

/// Fragments sharing a baseline, left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub fragments: Vec<Fragment>,
}

impl Line {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Line { fragments }
    }

    /// Concatenated fragment texts, without separators.
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

/// A vertical group of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub bbox: Rect,
    pub lines: Vec<Line>,
}

impl Block {
    pub fn new(bbox: Rect, lines: Vec<Line>) -> Self {
        Block { bbox, lines }
    }

    /// Build a block whose bounding box covers all of its fragments.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        let bbox = lines
            .iter()
            .flat_map(|l| l.fragments.iter().map(|f| f.bbox))
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or_default();
        Block { bbox, lines }
    }

    /// Every fragment text joined by single spaces (used for boilerplate matching).
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .flat_map(|l| l.fragments.iter().map(|f| f.text.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub height: f32,
    pub blocks: Vec<Block>,
    /// Hyperlink hot zones on the page.
    #[serde(default)]
    pub links: Vec<Rect>,
}

impl Page {
    pub fn new(number: usize, height: f32) -> Self {
        Page {
            number,
            height,
            blocks: Vec::new(),
            links: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    #[must_use]
    pub fn with_link(mut self, rect: Rect) -> Self {
        self.links.push(rect);
        self
    }

    /// Whether `rect` overlaps any hyperlink region of this page.
    pub fn is_linked(&self, rect: &Rect) -> bool {
        self.links.iter().any(|link| link.intersects(rect))
    }
}

/// A fully materialized Span Stream: pages in reading order plus the
/// document outline, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
    #[serde(default)]
    pub toc: Vec<TocEntry>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Document {
            pages,
            toc: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_toc(mut self, toc: Vec<TocEntry>) -> Self {
        self.toc = toc;
        self
    }

    pub fn fragment_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.blocks)
            .flat_map(|b| &b.lines)
            .map(|l| l.fragments.len())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One numbered heading and the body text up to the next accepted heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub number: String,
    pub title: String,
    pub level: usize,
    pub page: usize,
    pub content: String,
}
