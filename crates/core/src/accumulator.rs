//! The section state machine.
//!
//! The accumulator owns the single open [`Section`] and the last accepted
//! heading number. It is fed one event at a time (plain text, heading
//! candidate, end of line) and hands back the sealed sections at the end.

use crate::numbering::Numbering;
use crate::sequence::BoundaryValidator;
use crate::types::Section;

/// Whether output is being produced yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Waiting for the configured start heading; everything is dropped.
    Suppressed,
    Active,
}

/// A heading match with its stitched title, ready to be judged.
#[derive(Debug, Clone)]
pub struct HeadingCandidate<'a> {
    pub number: &'a Numbering,
    /// The numbering exactly as it appears in the document.
    pub raw_number: &'a str,
    pub title: &'a str,
    /// Text of the heading fragment alone, folded into the open section when
    /// the candidate is rejected.
    pub fragment_text: &'a str,
    pub page: usize,
}

/// What happened to a heading candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Dropped while the gate was closed.
    Suppressed,
    /// Opened a new section.
    Opened,
    /// Out of sequence (or not in the TOC): folded into the open section as text.
    Folded,
}

#[derive(Debug)]
pub struct SectionAccumulator<'v> {
    validator: &'v BoundaryValidator,
    start: Option<Numbering>,
    gate: Gate,
    current: Option<Section>,
    last_accepted: Option<Numbering>,
    /// The current line has appended text to the open section.
    line_dirty: bool,
    sealed: Vec<Section>,
}

impl<'v> SectionAccumulator<'v> {
    /// `start` closes the gate until a heading with that number shows up.
    pub fn new(validator: &'v BoundaryValidator, start: Option<Numbering>) -> Self {
        let gate = if start.is_some() {
            Gate::Suppressed
        } else {
            Gate::Active
        };
        Self {
            validator,
            start,
            gate,
            current: None,
            last_accepted: None,
            line_dirty: false,
            sealed: Vec::new(),
        }
    }

    pub fn gate(&self) -> Gate {
        self.gate
    }

    pub fn current(&self) -> Option<&Section> {
        self.current.as_ref()
    }

    pub fn last_accepted(&self) -> Option<&Numbering> {
        self.last_accepted.as_ref()
    }

    /// Append ordinary text to the open section, if any.
    pub fn push_text(&mut self, text: &str) {
        if self.gate == Gate::Suppressed || text.is_empty() {
            return;
        }
        if let Some(section) = self.current.as_mut() {
            section.content.push_str(text);
            self.line_dirty = true;
        }
    }

    /// Judge a heading candidate: open a new section, fold it in as text, or
    /// drop it while suppressed.
    pub fn offer_heading(&mut self, candidate: &HeadingCandidate<'_>) -> Decision {
        if self.gate == Gate::Suppressed {
            if self.start.as_ref() != Some(candidate.number) {
                return Decision::Suppressed;
            }
            log::debug!(
                "start heading {} found on page {}, extraction begins",
                candidate.raw_number,
                candidate.page
            );
            self.gate = Gate::Active;
        }

        let accepted = self.validator.accepts(
            self.last_accepted.as_ref(),
            candidate.number,
            candidate.raw_number,
        );

        if !accepted {
            log::debug!(
                "heading {} on page {} rejected after {}, kept as text",
                candidate.raw_number,
                candidate.page,
                self.last_accepted
                    .as_ref()
                    .map_or_else(|| "start".to_string(), ToString::to_string)
            );
            self.push_text(candidate.fragment_text);
            return Decision::Folded;
        }

        self.seal();
        log::debug!(
            "section {} '{}' opened on page {}",
            candidate.raw_number,
            candidate.title,
            candidate.page
        );
        self.current = Some(Section {
            number: candidate.raw_number.to_string(),
            title: candidate.title.to_string(),
            level: candidate.number.level(),
            page: candidate.page,
            content: String::new(),
        });
        self.last_accepted = Some(candidate.number.clone());
        Decision::Opened
    }

    /// Close the current line: a line that contributed text ends with `\n`.
    pub fn end_line(&mut self) {
        if self.line_dirty {
            if let Some(section) = self.current.as_mut() {
                section.content.push('\n');
            }
        }
        self.line_dirty = false;
    }

    /// Seal the open section and return every section in encounter order.
    pub fn finish(mut self) -> Vec<Section> {
        self.end_line();
        self.seal();
        self.sealed
    }

    fn seal(&mut self) {
        // A heading in the middle of a line still terminates the previous
        // section's partial line.
        self.end_line();
        if let Some(section) = self.current.take() {
            self.sealed.push(section);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SequencePolicy;
    use crate::toc::TocHint;

    fn n(s: &str) -> Numbering {
        Numbering::parse(s).unwrap()
    }

    fn offer(acc: &mut SectionAccumulator<'_>, number: &str, title: &str, page: usize) -> Decision {
        let numbering = n(number);
        let text = format!("{number} {title}");
        acc.offer_heading(&HeadingCandidate {
            number: &numbering,
            raw_number: number,
            title,
            fragment_text: &text,
            page,
        })
    }

    fn strict() -> BoundaryValidator {
        BoundaryValidator::new(SequencePolicy::Strict, None)
    }

    #[test]
    fn test_empty_input_yields_no_sections() {
        let v = strict();
        let acc = SectionAccumulator::new(&v, None);
        assert!(acc.finish().is_empty());
    }

    #[test]
    fn test_text_before_first_heading_is_dropped() {
        let v = strict();
        let mut acc = SectionAccumulator::new(&v, None);
        acc.push_text("Cover page");
        acc.end_line();
        assert_eq!(offer(&mut acc, "1", "Intro", 1), Decision::Opened);
        acc.push_text("Body");
        acc.end_line();
        let sections = acc.finish();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "Body\n");
    }

    #[test]
    fn test_sections_are_sealed_in_order() {
        let v = strict();
        let mut acc = SectionAccumulator::new(&v, None);
        offer(&mut acc, "1", "A", 1);
        acc.end_line();
        acc.push_text("a body");
        acc.end_line();
        offer(&mut acc, "1.1", "B", 2);
        acc.end_line();
        offer(&mut acc, "2", "C", 3);
        acc.end_line();

        let sections = acc.finish();
        let numbers: Vec<_> = sections.iter().map(|s| s.number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "1.1", "2"]);
        assert_eq!(sections[0].content, "a body\n");
        assert_eq!(sections[1].level, 2);
        assert_eq!(sections[1].page, 2);
        assert_eq!(sections[2].content, "");
    }

    #[test]
    fn test_out_of_sequence_heading_is_folded() {
        let v = strict();
        let mut acc = SectionAccumulator::new(&v, None);
        offer(&mut acc, "1", "Intro", 1);
        acc.end_line();
        assert_eq!(offer(&mut acc, "3", "Elsewhere", 1), Decision::Folded);
        acc.end_line();

        let sections = acc.finish();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "3 Elsewhere\n");
    }

    #[test]
    fn test_folded_heading_without_open_section_is_dropped() {
        let toc = TocHint::from_titles(["2 Scope"]);
        let v = BoundaryValidator::new(SequencePolicy::Strict, Some(toc));
        let mut acc = SectionAccumulator::new(&v, None);
        assert_eq!(offer(&mut acc, "1", "Not in TOC", 1), Decision::Folded);
        acc.end_line();
        assert!(acc.finish().is_empty());
    }

    #[test]
    fn test_gate_suppresses_until_start_number() {
        let v = strict();
        let mut acc = SectionAccumulator::new(&v, Some(n("1.1")));
        assert_eq!(acc.gate(), Gate::Suppressed);
        assert_eq!(offer(&mut acc, "1", "Intro", 1), Decision::Suppressed);
        acc.push_text("intro body");
        acc.end_line();
        assert_eq!(offer(&mut acc, "1.1", "Background", 1), Decision::Opened);
        assert_eq!(acc.gate(), Gate::Active);
        acc.push_text("more");
        acc.end_line();

        let sections = acc.finish();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].number, "1.1");
        assert_eq!(sections[0].content, "more\n");
    }

    #[test]
    fn test_gate_heading_still_needs_toc_membership() {
        let toc = TocHint::from_titles(["3 Other"]);
        let v = BoundaryValidator::new(SequencePolicy::Strict, Some(toc));
        let mut acc = SectionAccumulator::new(&v, Some(n("2")));
        assert_eq!(offer(&mut acc, "2", "Start", 1), Decision::Folded);
        assert_eq!(acc.gate(), Gate::Active);
        assert!(acc.current().is_none());
    }

    #[test]
    fn test_heading_mid_line_terminates_previous_line() {
        let v = strict();
        let mut acc = SectionAccumulator::new(&v, None);
        offer(&mut acc, "1", "A", 1);
        acc.end_line();
        acc.push_text("tail of 1");
        offer(&mut acc, "2", "B", 1);
        acc.end_line();

        let sections = acc.finish();
        assert_eq!(sections[0].content, "tail of 1\n");
        assert_eq!(sections[1].content, "");
    }

    #[test]
    fn test_last_accepted_tracks_openings_only() {
        let v = strict();
        let mut acc = SectionAccumulator::new(&v, None);
        offer(&mut acc, "1", "A", 1);
        offer(&mut acc, "5", "Ref", 1);
        assert_eq!(acc.last_accepted(), Some(&n("1")));
        offer(&mut acc, "2", "B", 1);
        assert_eq!(acc.last_accepted(), Some(&n("2")));
    }
}
