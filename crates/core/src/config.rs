//! Extraction settings.
//!
//! [`ExtractOptions`] is plain data: it deserializes from a configuration
//! file and is filled in by command-line flags. Validation happens when it is
//! compiled into an [`Extractor`](crate::Extractor).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::matcher::DEFAULT_HEADING_PATTERN;
use crate::sequence::SequencePolicy;

fn default_heading_regex() -> String {
    DEFAULT_HEADING_PATTERN.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Heading pattern with two capture groups: numbering and title.
    pub heading_regex: String,
    /// Smaller text is never a heading.
    pub min_font_size: Option<f32>,
    /// Blocks whose text matches any of these regular expressions are skipped.
    pub exclude: Vec<String>,
    /// Blocks starting within this distance of the page top are skipped.
    pub header_height: Option<f32>,
    /// Blocks ending within this distance of the page bottom are skipped.
    pub footer_height: Option<f32>,
    /// First page to process, 1-based, inclusive.
    pub start_page: Option<usize>,
    /// Last page to process, 1-based, inclusive.
    pub end_page: Option<usize>,
    /// Produce nothing until a heading with this number is seen.
    pub start_header_number: Option<String>,
    pub sequence_policy: SequencePolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            heading_regex: default_heading_regex(),
            min_font_size: None,
            exclude: Vec::new(),
            header_height: None,
            footer_height: None,
            start_page: None,
            end_page: None,
            start_header_number: None,
            sequence_policy: SequencePolicy::default(),
        }
    }
}

impl ExtractOptions {
    #[must_use]
    pub fn with_heading_regex(mut self, pattern: impl Into<String>) -> Self {
        self.heading_regex = pattern.into();
        self
    }

    #[must_use]
    pub fn with_min_font_size(mut self, size: f32) -> Self {
        self.min_font_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_header_height(mut self, height: f32) -> Self {
        self.header_height = Some(height);
        self
    }

    #[must_use]
    pub fn with_footer_height(mut self, height: f32) -> Self {
        self.footer_height = Some(height);
        self
    }

    #[must_use]
    pub fn with_page_range(mut self, start: Option<usize>, end: Option<usize>) -> Self {
        self.start_page = start;
        self.end_page = end;
        self
    }

    #[must_use]
    pub fn with_start_header_number(mut self, number: impl Into<String>) -> Self {
        self.start_header_number = Some(number.into());
        self
    }

    #[must_use]
    pub fn with_sequence_policy(mut self, policy: SequencePolicy) -> Self {
        self.sequence_policy = policy;
        self
    }

    pub fn page_range(&self) -> Result<PageRange, ConfigError> {
        PageRange::new(self.start_page, self.end_page)
    }
}

/// Inclusive, 1-based page window. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRange {
    start: Option<usize>,
    end: Option<usize>,
}

impl PageRange {
    pub fn new(start: Option<usize>, end: Option<usize>) -> Result<Self, ConfigError> {
        if start == Some(0) || end == Some(0) {
            return Err(ConfigError::ZeroPage);
        }
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ConfigError::InvalidPageRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, page: usize) -> bool {
        self.start.is_none_or(|s| page >= s) && self.end.is_none_or(|e| page <= e)
    }
}
