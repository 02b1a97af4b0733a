//! Multi-fragment heading titles.
//!
//! Extraction layers split a visible heading into several runs whenever the
//! styling changes (`"4.2"` bold, `"Results"` regular), and sometimes put the
//! title on its own line under the number. The stitcher glues those pieces
//! back together. It only looks inside the heading's own block: titles that
//! continue into the next block are not recovered.

use crate::types::{Fragment, Line};

/// A reconstructed heading title and what it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchedTitle {
    /// Whitespace-normalized title.
    pub title: String,
    /// The heading fragment's text followed by every stitched piece.
    pub full_text: String,
    /// Whether the fragments after the heading on its line went into the title.
    pub consumed_rest_of_line: bool,
    /// Whether the following line went into the title.
    pub consumed_next_line: bool,
}

/// Titles shorter than this many characters pull in the next line.
const MIN_TITLE_CHARS: usize = 2;

/// Build the title for a heading fragment.
///
/// `rest_of_line` is every fragment after the heading on the same line and
/// `next_line` the following line of the same block, if there is one.
pub fn stitch_title(
    fragment_text: &str,
    remainder: &str,
    rest_of_line: &[Fragment],
    next_line: Option<&Line>,
) -> StitchedTitle {
    let mut title = remainder.to_string();
    let mut full_text = fragment_text.to_string();
    let mut consumed_rest_of_line = false;
    let mut consumed_next_line = false;

    if !rest_of_line.is_empty() {
        consumed_rest_of_line = true;
        for piece in rest_of_line.iter().map(|f| f.text.as_str()).filter(|t| !t.is_empty()) {
            title.push_str(piece);
            full_text.push_str(piece);
        }
    }

    if title.chars().count() < MIN_TITLE_CHARS {
        if let Some(line) = next_line {
            let pieces: String = line
                .fragments
                .iter()
                .map(|f| f.text.as_str())
                .filter(|t| !t.is_empty())
                .collect();
            if !pieces.is_empty() {
                consumed_next_line = true;
                title.push_str(&pieces);
                full_text.push_str(&pieces);
            }
        }
    }

    StitchedTitle {
        title: normalize_whitespace(&title),
        full_text,
        consumed_rest_of_line,
        consumed_next_line,
    }
}

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
