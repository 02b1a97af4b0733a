//! Heading detection on single fragments.

use regex::Regex;

use crate::error::ConfigError;
use crate::numbering::Numbering;
use crate::types::Fragment;

/// Optional leading whitespace, a dotted-decimal number, an optional
/// separator, then the rest of the fragment as the title remainder.
pub const DEFAULT_HEADING_PATTERN: &str = r"^\s*(\d+(?:\.\d+)*)(?:\s+|\.?\s+)?(.*)$";

/// Result of running the heading pattern over one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    Heading {
        number: Numbering,
        /// The numbering exactly as captured from the text.
        raw_number: &'a str,
        /// Title text following the number on the same fragment; may be empty.
        remainder: &'a str,
    },
    PlainText {
        text: &'a str,
    },
}

impl Classified<'_> {
    pub fn is_heading(&self) -> bool {
        matches!(self, Classified::Heading { .. })
    }
}

/// Compiled heading pattern plus the optional font-size gate.
#[derive(Debug, Clone)]
pub struct HeadingMatcher {
    pattern: Regex,
    min_font_size: Option<f32>,
}

impl HeadingMatcher {
    /// Compile `pattern`, which must have exactly two capture groups: the
    /// numbering and the title remainder.
    pub fn new(pattern: &str, min_font_size: Option<f32>) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        // captures_len counts the implicit whole-match group.
        let found = regex.captures_len() - 1;
        if found != 2 {
            return Err(ConfigError::PatternGroupCount {
                pattern: pattern.to_string(),
                found,
            });
        }

        if let Some(size) = min_font_size {
            if !size.is_finite() || size < 0.0 {
                return Err(ConfigError::InvalidDimension {
                    name: "minimum font size",
                    value: size,
                });
            }
        }

        Ok(Self {
            pattern: regex,
            min_font_size,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Classify a fragment's text.
    ///
    /// The pattern must match at the start of the fragment. Matches on text
    /// smaller than the minimum font size, and matches whose captured number
    /// does not parse as dotted integers, are plain text.
    pub fn classify<'a>(&self, fragment: &'a Fragment) -> Classified<'a> {
        let text = fragment.text.as_str();
        let plain = Classified::PlainText { text };

        if self
            .min_font_size
            .is_some_and(|min| fragment.font_size < min)
        {
            return plain;
        }

        let Some(caps) = self.pattern.captures(text) else {
            return plain;
        };
        if caps.get(0).is_none_or(|m| m.start() != 0) {
            return plain;
        }
        let Some(raw_number) = caps.get(1).map(|m| m.as_str()) else {
            return plain;
        };

        match Numbering::parse(raw_number) {
            Ok(number) => Classified::Heading {
                number,
                raw_number,
                remainder: caps.get(2).map_or("", |m| m.as_str()),
            },
            Err(err) => {
                log::trace!("ignoring heading-like fragment: {err}");
                plain
            }
        }
    }
}

impl Default for HeadingMatcher {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_HEADING_PATTERN).expect("default heading pattern is valid"),
            min_font_size: None,
        }
    }
}
