use thiserror::Error;

use crate::numbering::MalformedNumbering;

/// Rejected extraction configuration.
///
/// Raised once, when an [`Extractor`](crate::Extractor) is built; extraction
/// itself cannot fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid heading pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Heading pattern '{pattern}' must have exactly 2 capture groups (numbering, title), found {found}")]
    PatternGroupCount { pattern: String, found: usize },

    #[error("Invalid header/footer exclusion pattern '{pattern}': {source}")]
    InvalidExclusionPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid page range: start page {start} is after end page {end}")]
    InvalidPageRange { start: usize, end: usize },

    #[error("Page numbers are 1-based, got 0")]
    ZeroPage,

    #[error("Invalid start heading number: {0}")]
    InvalidStartNumber(#[from] MalformedNumbering),

    #[error("Invalid {name}: {value} (expected a finite, non-negative number)")]
    InvalidDimension { name: &'static str, value: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_count_display() {
        let err = ConfigError::PatternGroupCount {
            pattern: r"^(\d+)$".to_string(),
            found: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("exactly 2 capture groups"));
        assert!(msg.contains("found 1"));
    }

    #[test]
    fn test_page_range_display() {
        let err = ConfigError::InvalidPageRange { start: 5, end: 2 };
        assert_eq!(
            err.to_string(),
            "Invalid page range: start page 5 is after end page 2"
        );
    }

    #[test]
    fn test_start_number_from_malformed() {
        let err: ConfigError = MalformedNumbering("1.".to_string()).into();
        assert!(err.to_string().contains("'1.'"));
    }
}
