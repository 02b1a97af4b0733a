//! The extraction driver: walks a [`Document`] page by page and feeds the
//! [`SectionAccumulator`].

use crate::accumulator::{Decision, HeadingCandidate, SectionAccumulator};
use crate::config::{ExtractOptions, PageRange};
use crate::error::ConfigError;
use crate::hierarchy::{build_hierarchy, HierarchyNode};
use crate::matcher::{Classified, HeadingMatcher};
use crate::numbering::Numbering;
use crate::region::RegionFilter;
use crate::sequence::BoundaryValidator;
use crate::stitch::stitch_title;
use crate::toc::TocHint;
use crate::types::{Block, Document, Line, Page, Section};

/// Compiled, validated extraction settings.
///
/// Holds no per-document state: one extractor can process any number of
/// documents, from any number of threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    matcher: HeadingMatcher,
    region: RegionFilter,
    pages: PageRange,
    start: Option<Numbering>,
    options: ExtractOptions,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Result<Self, ConfigError> {
        let matcher = HeadingMatcher::new(&options.heading_regex, options.min_font_size)?;
        let region = RegionFilter::new(&options.exclude, options.header_height, options.footer_height)?;
        let pages = options.page_range()?;
        let start = options
            .start_header_number
            .as_deref()
            .map(Numbering::parse)
            .transpose()?;

        Ok(Self {
            matcher,
            region,
            pages,
            start,
            options,
        })
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Flat, encounter-ordered sections of `doc`.
    ///
    /// The document's outline, when it has one, is used to corroborate
    /// heading candidates.
    pub fn extract(&self, doc: &Document) -> Vec<Section> {
        let toc = (!doc.toc.is_empty()).then(|| TocHint::from_entries(&doc.toc));
        if let Some(hint) = &toc {
            log::debug!("using {} table of contents entries", hint.len());
        }
        let validator = BoundaryValidator::new(self.options.sequence_policy, toc);
        let mut acc = SectionAccumulator::new(&validator, self.start.clone());

        for page in doc.pages.iter().filter(|p| self.pages.contains(p.number)) {
            self.process_page(page, &mut acc);
        }

        let sections = acc.finish();
        log::debug!("extracted {} sections", sections.len());
        sections
    }

    /// Sections of `doc` nested by level.
    pub fn extract_hierarchy(&self, doc: &Document) -> Vec<HierarchyNode> {
        build_hierarchy(self.extract(doc))
    }

    fn process_page(&self, page: &Page, acc: &mut SectionAccumulator<'_>) {
        for block in &page.blocks {
            if let Some(reason) = self.region.excludes(block, page.height) {
                log::debug!("page {}: skipping block ({reason:?}): {:?}", page.number, block.text());
                continue;
            }
            self.process_block(page, block, acc);
        }
    }

    fn process_block(&self, page: &Page, block: &Block, acc: &mut SectionAccumulator<'_>) {
        let mut skip_line = false;

        for (line_idx, line) in block.lines.iter().enumerate() {
            if std::mem::take(&mut skip_line) {
                // Already used as the title of the heading above it.
                continue;
            }

            for (frag_idx, fragment) in line.fragments.iter().enumerate() {
                if fragment.text.is_empty() {
                    continue;
                }

                let (number, raw_number, remainder) = match self.matcher.classify(fragment) {
                    Classified::Heading {
                        number,
                        raw_number,
                        remainder,
                    } => (number, raw_number, remainder),
                    Classified::PlainText { text } => {
                        acc.push_text(text);
                        continue;
                    }
                };

                if self.region.is_citation(page, fragment) {
                    log::trace!("page {}: '{}' is a link, not a heading", page.number, fragment.text);
                    acc.push_text(&fragment.text);
                    continue;
                }

                let next_line = block
                    .lines
                    .get(line_idx + 1)
                    .filter(|next| !self.starts_with_heading(next));
                let stitched = stitch_title(
                    &fragment.text,
                    remainder,
                    &line.fragments[frag_idx + 1..],
                    next_line,
                );

                let decision = acc.offer_heading(&HeadingCandidate {
                    number: &number,
                    raw_number,
                    title: &stitched.title,
                    fragment_text: &fragment.text,
                    page: page.number,
                });

                if decision == Decision::Opened {
                    skip_line = stitched.consumed_next_line;
                    if stitched.consumed_rest_of_line {
                        break;
                    }
                }
            }

            acc.end_line();
        }
    }
}

impl Extractor {
    /// A line opening with a numbered heading is never pulled into the
    /// title above it.
    fn starts_with_heading(&self, line: &Line) -> bool {
        line.fragments
            .iter()
            .find(|f| !f.text.is_empty())
            .is_some_and(|f| self.matcher.classify(f).is_heading())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            matcher: HeadingMatcher::default(),
            region: RegionFilter::default(),
            pages: PageRange::default(),
            start: None,
            options: ExtractOptions::default(),
        }
    }
}

/// Extract flat sections with `options`.
pub fn extract_sections(doc: &Document, options: ExtractOptions) -> Result<Vec<Section>, ConfigError> {
    Ok(Extractor::new(options)?.extract(doc))
}

/// Extract nested sections with `options`.
pub fn extract_hierarchy(
    doc: &Document,
    options: ExtractOptions,
) -> Result<Vec<HierarchyNode>, ConfigError> {
    Ok(Extractor::new(options)?.extract_hierarchy(doc))
}
