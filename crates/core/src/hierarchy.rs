use serde::{Deserialize, Serialize};

use crate::types::Section;

/// A section together with the sections nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    #[serde(flatten)]
    pub section: Section,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            children: Vec::new(),
        }
    }

    pub fn level(&self) -> usize {
        self.section.level
    }

    /// Number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(HierarchyNode::size).sum::<usize>()
    }
}

/// Nest a flat, encounter-ordered section list by heading level.
///
/// Single pass with a stack of open ancestors. Before a section is pushed,
/// every open node at the same or a deeper level is closed and handed to its
/// parent (or to the root list), so the stack always holds strictly
/// increasing levels from bottom to top.
pub fn build_hierarchy(sections: Vec<Section>) -> Vec<HierarchyNode> {
    let mut roots: Vec<HierarchyNode> = Vec::new();
    let mut stack: Vec<HierarchyNode> = Vec::new();

    for section in sections {
        let node = HierarchyNode::new(section);

        while stack.last().is_some_and(|top| top.level() >= node.level()) {
            close_top(&mut stack, &mut roots);
        }

        stack.push(node);
        debug_assert!(levels_strictly_increase(&stack));
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    roots
}

/// Pop the top of the stack and attach it to the node beneath, or to the roots.
fn close_top(stack: &mut Vec<HierarchyNode>, roots: &mut Vec<HierarchyNode>) {
    if let Some(finished) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(finished),
            None => roots.push(finished),
        }
    }
    debug_assert!(levels_strictly_increase(stack));
}

fn levels_strictly_increase(stack: &[HierarchyNode]) -> bool {
    stack.windows(2).all(|w| w[0].level() < w[1].level())
}

/// Pre-order traversal; the inverse of [`build_hierarchy`].
pub fn flatten(forest: &[HierarchyNode]) -> Vec<Section> {
    let mut out = Vec::with_capacity(forest.iter().map(HierarchyNode::size).sum());
    for node in forest {
        collect(node, &mut out);
    }
    out
}

fn collect(node: &HierarchyNode, out: &mut Vec<Section>) {
    out.push(node.section.clone());
    for child in &node.children {
        collect(child, out);
    }
}
