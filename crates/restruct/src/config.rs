//! Layered configuration: defaults, then a TOML file, then flags.

use std::path::{Path, PathBuf};

use restruct_core::{ExtractOptions, SequencePolicy};
use serde::Deserialize;

use crate::prelude::*;

pub const DEFAULT_CONFIG_FILE: &str = "restruct.toml";

/// Contents of a `restruct.toml`. Extraction keys sit at the top level.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    #[serde(flatten)]
    pub extract: ExtractOptions,
    pub nested: bool,
}

/// Extraction flags. Every flag is optional and, when given, overrides the
/// configuration file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ExtractArgs {
    /// Heading pattern with two capture groups: number and title
    #[arg(long, env = "RESTRUCT_HEADING_REGEX", value_name = "RE")]
    pub heading_regex: Option<String>,

    /// Text smaller than this is never a heading
    #[arg(long, env = "RESTRUCT_MIN_FONT_SIZE", value_name = "PT")]
    pub min_font_size: Option<f32>,

    /// Skip blocks whose text matches this pattern (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Skip blocks starting within this distance of the page top
    #[arg(long, env = "RESTRUCT_HEADER_HEIGHT", value_name = "PT")]
    pub header_height: Option<f32>,

    /// Skip blocks ending within this distance of the page bottom
    #[arg(long, env = "RESTRUCT_FOOTER_HEIGHT", value_name = "PT")]
    pub footer_height: Option<f32>,

    /// First page to process (1-based, inclusive)
    #[arg(long, env = "RESTRUCT_START_PAGE", value_name = "N")]
    pub start_page: Option<usize>,

    /// Last page to process (1-based, inclusive)
    #[arg(long, env = "RESTRUCT_END_PAGE", value_name = "N")]
    pub end_page: Option<usize>,

    /// Ignore everything before the heading with this number
    #[arg(long, env = "RESTRUCT_START_HEADER_NUMBER", value_name = "NUM")]
    pub start_header_number: Option<String>,

    /// Accept 1.1 -> 1.3 as a boundary
    #[arg(long, env = "RESTRUCT_ALLOW_SIBLING_SKIP")]
    pub allow_sibling_skip: bool,
}

impl ExtractArgs {
    /// Overlay the flags that were given on top of `options`.
    pub fn apply(&self, mut options: ExtractOptions) -> ExtractOptions {
        if let Some(pattern) = &self.heading_regex {
            options.heading_regex = pattern.clone();
        }
        if !self.exclude.is_empty() {
            options.exclude = self.exclude.clone();
        }
        if self.allow_sibling_skip {
            options.sequence_policy = SequencePolicy::AllowSiblingSkip;
        }

        options.min_font_size = self.min_font_size.or(options.min_font_size);
        options.header_height = self.header_height.or(options.header_height);
        options.footer_height = self.footer_height.or(options.footer_height);
        options.start_page = self.start_page.or(options.start_page);
        options.end_page = self.end_page.or(options.end_page);
        options.start_header_number = self
            .start_header_number
            .clone()
            .or(options.start_header_number);
        options
    }
}

/// Read the configuration file.
///
/// An explicit path must exist. Without one, `restruct.toml` in `dir` is used
/// when present and defaults otherwise.
pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<FileConfig> {
    let path: PathBuf = match explicit {
        Some(path) if !path.exists() => return Err(Error::ConfigNotFound(path.to_path_buf()).into()),
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            if !candidate.exists() {
                return Ok(FileConfig::default());
            }
            candidate
        }
    };

    log::debug!("reading configuration from {}", path.display());
    let text = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).wrap_err_with(|| format!("invalid configuration in {}", path.display()))
}
