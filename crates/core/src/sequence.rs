//! Numbering-sequence validation.
//!
//! Decides whether a candidate heading number legally continues the outline
//! after the previously accepted heading. Candidates that do not are treated
//! as in-text references rather than structural boundaries.

use serde::{Deserialize, Serialize};

use crate::numbering::Numbering;
use crate::toc::TocHint;

/// How strictly the last component of a number must follow its predecessor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePolicy {
    /// Siblings must increment by exactly one (`1.1 -> 1.2`, never `1.1 -> 1.3`).
    #[default]
    Strict,
    /// Siblings may jump forward (`1.1 -> 1.3`), e.g. for documents with
    /// deleted or unnumbered sections. Repeats and decreases are still rejected.
    AllowSiblingSkip,
}

impl SequencePolicy {
    fn next_ok(self, expected_prev: u32, got: u32) -> bool {
        match self {
            SequencePolicy::Strict => expected_prev.checked_add(1) == Some(got),
            SequencePolicy::AllowSiblingSkip => got > expected_prev,
        }
    }
}

/// Strict successor check; see [`is_successor_with`].
pub fn is_successor(prev: Option<&Numbering>, curr: &Numbering) -> bool {
    is_successor_with(prev, curr, SequencePolicy::Strict)
}

/// Whether `curr` is a legal successor of `prev`.
///
/// Rules, in priority order:
///
/// | shape | example | rule |
/// |-------|---------|------|
/// | first heading | `- -> 3.1` | always valid |
/// | sibling | `1.1 -> 1.2` | same parent, last component increments |
/// | back to top | `1.3 -> 2` | single component, increments `prev[0]` |
/// | descend | `1.2 -> 1.2.1` | exactly one level deeper under `prev` |
/// | ascend | `4.1.6 -> 4.2` | shorter, shared prefix, increments at its level |
///
/// Anything else (repeats, decreasing siblings, descending two levels at
/// once) is rejected. The function is total and never panics.
pub fn is_successor_with(prev: Option<&Numbering>, curr: &Numbering, policy: SequencePolicy) -> bool {
    let Some(prev) = prev else {
        return true;
    };

    let p = prev.components();
    let c = curr.components();

    if c.len() == p.len() {
        return curr.parent() == prev.parent() && policy.next_ok(prev.last(), curr.last());
    }

    if c.len() == 1 && policy.next_ok(p[0], c[0]) {
        return true;
    }

    if c.len() == p.len() + 1 && curr.parent() == p {
        return true;
    }

    if c.len() < p.len() {
        let depth = c.len() - 1;
        return curr.parent() == &p[..depth] && policy.next_ok(p[depth], curr.last());
    }

    false
}

/// The single decision point the accumulator consults before opening a new
/// section: sequence validity plus, when available, TOC corroboration.
#[derive(Debug, Clone, Default)]
pub struct BoundaryValidator {
    policy: SequencePolicy,
    toc: Option<TocHint>,
}

impl BoundaryValidator {
    pub fn new(policy: SequencePolicy, toc: Option<TocHint>) -> Self {
        // An empty outline carries no information, so it must not veto headings.
        let toc = toc.filter(|hint| !hint.is_empty());
        Self { policy, toc }
    }

    pub fn policy(&self) -> SequencePolicy {
        self.policy
    }

    pub fn has_toc(&self) -> bool {
        self.toc.is_some()
    }

    /// Accept `curr` (spelled `raw` in the document) as a new boundary after `prev`.
    pub fn accepts(&self, prev: Option<&Numbering>, curr: &Numbering, raw: &str) -> bool {
        if let Some(toc) = &self.toc {
            if !toc.mentions(raw) {
                log::trace!("heading {raw} not found in table of contents");
                return false;
            }
        }
        is_successor_with(prev, curr, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Numbering {
        Numbering::parse(s).unwrap()
    }

    fn succ(prev: &str, curr: &str) -> bool {
        is_successor(Some(&n(prev)), &n(curr))
    }

    #[test]
    fn test_first_heading_always_valid() {
        for curr in ["1", "3.2", "0", "9.9.9.9"] {
            assert!(is_successor(None, &n(curr)));
        }
    }

    #[test]
    fn test_successor_table() {
        let cases = [
            ("1.1", "1.2", true),
            ("1.1", "2", true),
            ("1", "1.1", true),
            ("1.2", "1.2.1", true),
            ("4.1.6", "4.2", true),
            ("4.1.6", "5", true),
            ("1", "2", true),
            ("1.1", "1.1", false),
            ("1.1", "1.3", false),
            ("1.2", "1.1", false),
            ("1", "1.1.1", false),
            ("1.1", "2.1", false),
            ("4.1.6", "4.3", false),
            ("4.1.6", "3.2", false),
            ("2", "1", false),
            ("1.2", "1.3.1", false),
        ];
        for (prev, curr, expected) in cases {
            assert_eq!(succ(prev, curr), expected, "{prev} -> {curr}");
        }
    }

    #[test]
    fn test_descend_does_not_check_first_child_index() {
        // Only the parent prefix matters when going one level deeper.
        assert!(succ("1", "1.0"));
        assert!(succ("1", "1.4"));
    }

    #[test]
    fn test_sibling_skip_policy() {
        let skip = SequencePolicy::AllowSiblingSkip;
        assert!(is_successor_with(Some(&n("1.1")), &n("1.3"), skip));
        assert!(is_successor_with(Some(&n("1.3")), &n("3"), skip));
        assert!(is_successor_with(Some(&n("4.1.6")), &n("4.4"), skip));
        assert!(!is_successor_with(Some(&n("1.1")), &n("1.1"), skip));
        assert!(!is_successor_with(Some(&n("1.3")), &n("1.2"), skip));
        assert!(!is_successor_with(Some(&n("1")), &n("1.1.1"), skip));
    }

    #[test]
    fn test_no_overflow_at_max_component() {
        let max = Numbering::try_from(vec![u32::MAX]).unwrap();
        assert!(!is_successor(Some(&max), &n("0")));
    }

    #[test]
    fn test_validator_without_toc() {
        let v = BoundaryValidator::new(SequencePolicy::Strict, None);
        assert!(!v.has_toc());
        assert!(v.accepts(None, &n("1"), "1"));
        assert!(!v.accepts(Some(&n("1")), &n("3"), "3"));
    }

    #[test]
    fn test_validator_requires_toc_membership() {
        let toc = TocHint::from_titles(["1 Introduction", "2 Method"]);
        let v = BoundaryValidator::new(SequencePolicy::Strict, Some(toc));
        assert!(v.has_toc());
        assert!(v.accepts(None, &n("1"), "1"));
        assert!(v.accepts(Some(&n("1")), &n("2"), "2"));
        // In sequence, but absent from the outline.
        assert!(!v.accepts(Some(&n("2")), &n("3"), "3"));
        // Present in the outline, but out of sequence.
        assert!(!v.accepts(Some(&n("2")), &n("1"), "1"));
    }

    #[test]
    fn test_validator_ignores_empty_toc() {
        let v = BoundaryValidator::new(SequencePolicy::Strict, Some(TocHint::default()));
        assert!(!v.has_toc());
        assert!(v.accepts(None, &n("7"), "7"));
    }
}
