//! Markup cleanup applied to resolved text-fact content before it lands in
//! the classic instance.

use super::tree::XmlNode;

/// Inline wrappers replaced by their children.
pub const INLINE_WRAPPERS: [&str; 3] = ["footnote", "nonNumeric", "nonFraction"];

const EXCLUDE: &str = "exclude";

/// Removes every `exclude` subtree, descendants included.
pub fn strip_excluded(nodes: Vec<XmlNode>) -> Vec<XmlNode> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            XmlNode::Element(e) if e.local_name() == EXCLUDE => None,
            XmlNode::Element(mut e) => {
                e.children = strip_excluded(e.children);
                Some(XmlNode::Element(e))
            }
            text => Some(text),
        })
        .collect()
}

/// Splices the children of inline wrapper elements in place of the
/// wrapper, recursively. Other elements, their attributes, and text are
/// kept as they are.
pub fn unwrap_inline(nodes: Vec<XmlNode>) -> Vec<XmlNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            XmlNode::Element(e) if INLINE_WRAPPERS.contains(&e.local_name()) => {
                out.extend(unwrap_inline(e.children));
            }
            XmlNode::Element(mut e) => {
                e.children = unwrap_inline(e.children);
                out.push(XmlNode::Element(e));
            }
            text => out.push(text),
        }
    }
    out
}

/// Joins adjacent text nodes.
pub fn merge_text(nodes: Vec<XmlNode>) -> Vec<XmlNode> {
    let mut out: Vec<XmlNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let XmlNode::Text(t) = &node {
            if let Some(XmlNode::Text(prev)) = out.last_mut() {
                prev.push_str(t);
                continue;
            }
        }
        out.push(node);
    }
    out
}
