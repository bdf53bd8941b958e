use std::collections::{HashMap, HashSet};

use crate::attr::find_node_attr_non_empty;

/// Walks the `continuedAt` chain of an inline text fact or footnote.
///
/// Yields the starting node, then each continuation it links to in chain
/// order. The walk stops when a fragment has no `continuedAt`, when the
/// target id is not a known continuation, or when a target id has already
/// been visited.
pub struct ContinuationChain<'d, 'a, 'input> {
    continuations: &'d HashMap<String, roxmltree::Node<'a, 'input>>,
    next: Option<roxmltree::Node<'a, 'input>>,
    visited: HashSet<&'a str>,
}

impl<'d, 'a, 'input> ContinuationChain<'d, 'a, 'input> {
    pub fn new(
        start: roxmltree::Node<'a, 'input>,
        continuations: &'d HashMap<String, roxmltree::Node<'a, 'input>>,
    ) -> Self {
        Self {
            continuations,
            next: Some(start),
            visited: HashSet::new(),
        }
    }
}

impl<'d, 'a, 'input> Iterator for ContinuationChain<'d, 'a, 'input> {
    type Item = roxmltree::Node<'a, 'input>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if let Some(target) = find_node_attr_non_empty(current, "continuedAt") {
            let target = target.trim();
            if !self.visited.insert(target) {
                log::warn!("Continuation cycle at {}; chain truncated", target);
            } else if let Some(node) = self.continuations.get(target) {
                self.next = Some(*node);
            } else {
                log::debug!("Continuation {} not found; chain ends", target);
            }
        }
        Some(current)
    }
}
