//! Page-furniture removal and citation suppression.

use regex::Regex;

use crate::error::ConfigError;
use crate::types::{Block, Fragment, Page};

/// Why a block was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockExclusion {
    /// Matched one of the configured boilerplate patterns.
    Boilerplate,
    /// Starts inside the header band.
    HeaderBand,
    /// Ends inside the footer band.
    FooterBand,
}

#[derive(Debug, Clone, Default)]
pub struct RegionFilter {
    boilerplate: Option<Regex>,
    header_height: Option<f32>,
    footer_height: Option<f32>,
}

impl RegionFilter {
    /// Build a filter from boilerplate patterns and band heights (in points).
    ///
    /// Patterns are regular expressions; a block is boilerplate when any of
    /// them is found anywhere in its text.
    pub fn new(
        patterns: &[String],
        header_height: Option<f32>,
        footer_height: Option<f32>,
    ) -> Result<Self, ConfigError> {
        for pattern in patterns {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidExclusionPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        let boilerplate = if patterns.is_empty() {
            None
        } else {
            let joined = patterns.join("|");
            let regex = Regex::new(&joined)
                .map_err(|source| ConfigError::InvalidExclusionPattern { pattern: joined, source })?;
            Some(regex)
        };

        for (name, value) in [("header height", header_height), ("footer height", footer_height)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ConfigError::InvalidDimension { name, value: v });
                }
            }
        }

        Ok(Self {
            boilerplate,
            header_height,
            footer_height,
        })
    }

    /// Whether the block should be skipped entirely, and why.
    pub fn excludes(&self, block: &Block, page_height: f32) -> Option<BlockExclusion> {
        if let Some(re) = &self.boilerplate {
            if re.is_match(&block.text()) {
                return Some(BlockExclusion::Boilerplate);
            }
        }
        if self.header_height.is_some_and(|h| block.bbox.y0 < h) {
            return Some(BlockExclusion::HeaderBand);
        }
        if self
            .footer_height
            .is_some_and(|h| block.bbox.y1 > page_height - h)
        {
            return Some(BlockExclusion::FooterBand);
        }
        None
    }

    /// A heading-looking fragment under a hyperlink is a cross-reference,
    /// not a structural heading.
    pub fn is_citation(&self, page: &Page, fragment: &Fragment) -> bool {
        page.is_linked(&fragment.bbox)
    }
}
