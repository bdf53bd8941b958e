//! Rewrites an inline XBRL (XHTML) document into a classic XBRL instance.
//!
//! Facts, contexts, units, schema refs and footnote relationships are
//! located once in [`Document::decode`]. [`Document::convert`] then builds
//! the output tree, naming every element and attribute through one
//! [`NameProvider`], and assembles the `xbrl` root last so its namespace
//! declarations cover exactly the prefixes in use.

pub mod cleanup;
pub mod continuation;
mod footnotes;
pub mod tree;

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use self::cleanup::{merge_text, strip_excluded, unwrap_inline};
use self::continuation::ContinuationChain;
use self::tree::{children_from_source, from_source, is_plain_text, text_of, XmlDocument, XmlElement, XmlNode};
use crate::attr::{
    find_node_attr, find_node_attr_non_empty, is_inline_namespace, NameProvider,
    FACT_FOOTNOTE_ARCROLE, LINK, XBRLI, XSI,
};
use crate::error::{Result, XbrlError};
use crate::source::{decode_utf8, parse_document};

type Node<'a, 'input> = roxmltree::Node<'a, 'input>;

#[derive(Clone, Copy, Debug, Default)]
pub struct ConvertOptions {
    /// Pretty-print the output with two-space indentation.
    pub indent: bool,
}

/// Converts raw inline XBRL bytes into classic instance bytes.
pub fn convert(raw: &[u8], options: &ConvertOptions) -> Result<Vec<u8>> {
    let text = decode_utf8(raw)?;
    let doc = parse_document(text)?;
    Document::decode(&doc)?.convert(options)
}

/// Converts raw inline XBRL bytes and writes the result to `destination`.
pub fn extract(raw: &[u8], destination: &Path, options: &ConvertOptions) -> Result<()> {
    let text = decode_utf8(raw)?;
    let doc = parse_document(text)?;
    Document::decode(&doc)?.extract(destination, options)
}

/// Deterministic id for a fact that has none: the first 128 bits of
/// SHA-256 over `name + "_" + contextRef`, as 32 lowercase hex chars.
pub fn generated_fact_id(name: &str, context_ref: &str) -> String {
    let digest = Sha256::digest(format!("{}_{}", name, context_ref).as_bytes());
    hex::encode(&digest[..16])
}

fn is_inline(node: Node<'_, '_>, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace().is_some_and(is_inline_namespace)
}

fn index_by_id<'a, 'input>(nodes: &[Node<'a, 'input>]) -> HashMap<String, Node<'a, 'input>> {
    let mut index = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if let Some(id) = find_node_attr_non_empty(*node, "id") {
            index.entry(id.trim().to_string()).or_insert(*node);
        }
    }
    index
}

/// Resolved text content goes in as a single text node when it carries no
/// markup, otherwise as the element tree itself.
fn attach(element: &mut XmlElement, content: Vec<XmlNode>) {
    if is_plain_text(&content) {
        let text = text_of(&content);
        if !text.is_empty() {
            element.push(XmlNode::Text(text));
        }
    } else {
        element.children.extend(content);
    }
}

/// The located parts of a parsed inline document.
pub struct Document<'a, 'input> {
    pub html: Node<'a, 'input>,
    pub schema_refs: Vec<Node<'a, 'input>>,
    pub contexts: Vec<Node<'a, 'input>>,
    pub units: Vec<Node<'a, 'input>>,
    pub non_fractions: Vec<Node<'a, 'input>>,
    pub non_numerics: Vec<Node<'a, 'input>>,
    pub excludes: Vec<Node<'a, 'input>>,
    pub footnote_relationships: Vec<Node<'a, 'input>>,
    /// `continuation` elements by id.
    pub continuations: HashMap<String, Node<'a, 'input>>,
    /// `footnote` elements by id.
    pub footnotes: HashMap<String, Node<'a, 'input>>,
    fact_index: HashMap<String, Node<'a, 'input>>,
}

impl<'a, 'input> Document<'a, 'input> {
    pub fn decode(doc: &'a roxmltree::Document<'input>) -> Result<Self> {
        let html = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "html")
            .ok_or(XbrlError::MissingElement("html"))?;

        let headers: Vec<Node> = doc.descendants().filter(|n| is_inline(*n, "header")).collect();
        let schema_refs = headers
            .iter()
            .flat_map(|h| h.descendants())
            .filter(|n| n.has_tag_name((LINK, "schemaRef")))
            .collect();
        let resources: Vec<Node> = headers
            .iter()
            .flat_map(|h| h.descendants())
            .filter(|n| is_inline(*n, "resources"))
            .collect();
        let contexts = resources
            .iter()
            .flat_map(|r| r.descendants())
            .filter(|n| n.has_tag_name((XBRLI, "context")))
            .collect();
        let units = resources
            .iter()
            .flat_map(|r| r.descendants())
            .filter(|n| n.has_tag_name((XBRLI, "unit")))
            .collect();

        let non_fractions: Vec<Node> = doc
            .descendants()
            .filter(|n| is_inline(*n, "nonFraction"))
            .collect();
        let non_numerics: Vec<Node> = doc
            .descendants()
            .filter(|n| is_inline(*n, "nonNumeric"))
            .collect();
        let excludes = doc.descendants().filter(|n| is_inline(*n, "exclude")).collect();
        let footnote_relationships = doc
            .descendants()
            .filter(|n| is_inline(*n, "relationship"))
            .filter(|n| {
                find_node_attr(*n, "arcrole").map_or(true, |a| a.trim() == FACT_FOOTNOTE_ARCROLE)
            })
            .collect();

        let continuation_nodes: Vec<Node> = doc
            .descendants()
            .filter(|n| is_inline(*n, "continuation"))
            .collect();
        let footnote_nodes: Vec<Node> = doc
            .descendants()
            .filter(|n| is_inline(*n, "footnote"))
            .collect();

        let mut fact_index = index_by_id(&non_fractions);
        for (id, node) in index_by_id(&non_numerics) {
            fact_index.entry(id).or_insert(node);
        }

        let document = Self {
            html,
            schema_refs,
            contexts,
            units,
            non_fractions,
            non_numerics,
            excludes,
            footnote_relationships,
            continuations: index_by_id(&continuation_nodes),
            footnotes: index_by_id(&footnote_nodes),
            fact_index,
        };
        log::debug!(
            "Decoded inline document: {} contexts, {} units, {} numeric and {} non-numeric facts, {} footnotes",
            document.contexts.len(),
            document.units.len(),
            document.non_fractions.len(),
            document.non_numerics.len(),
            document.footnotes.len()
        );
        Ok(document)
    }

    /// Whether `id` names a numeric or non-numeric fact in the source.
    pub fn has_fact(&self, id: &str) -> bool {
        self.fact_index.contains_key(id)
    }

    pub fn convert(&self, options: &ConvertOptions) -> Result<Vec<u8>> {
        let mut names = NameProvider::new(self.html.namespaces().map(|ns| (ns.name(), ns.uri())));

        let mut children = Vec::new();
        for schema_ref in &self.schema_refs {
            children.extend(from_source(*schema_ref, &mut names));
        }
        children.extend(
            self.non_fractions
                .iter()
                .filter_map(|n| self.classic_numeric_fact(*n, &mut names))
                .map(XmlNode::Element),
        );
        children.extend(
            self.non_numerics
                .iter()
                .filter_map(|n| self.classic_non_numeric_fact(*n, &mut names))
                .map(XmlNode::Element),
        );
        for unit in &self.units {
            children.extend(from_source(*unit, &mut names));
        }
        for context in &self.contexts {
            children.extend(from_source(*context, &mut names));
        }
        if let Some(link) = self.classic_footnote_link(&mut names) {
            children.push(XmlNode::Element(link));
        }

        let mut xbrl = XmlElement::new(names.provide_name(Some(XBRLI), "xbrl"));
        xbrl.children = children;
        xbrl.attrs = names.ns_attrs(xbrl.names());
        log::info!(
            "Converted inline document: {} output elements under {}",
            xbrl.children.len(),
            xbrl.name
        );

        let mut out = XmlDocument::new();
        out.set_root(xbrl);
        out.to_bytes(options.indent)
    }

    pub fn extract(&self, destination: &Path, options: &ConvertOptions) -> Result<()> {
        let bytes = self.convert(options)?;
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(destination, bytes)?;
        log::info!("Wrote classic instance to {:?}", destination);
        Ok(())
    }

    /// Fact element carrying the concept name, `contextRef` and `id`.
    /// `None` when the source lacks `name` or `contextRef`.
    fn classic_fact_element(&self, node: Node<'a, 'input>, names: &mut NameProvider) -> Option<XmlElement> {
        let Some(name) = find_node_attr_non_empty(node, "name") else {
            log::debug!("Dropping inline fact without name at {}", node.range().start);
            return None;
        };
        let Some(context_ref) = find_node_attr_non_empty(node, "contextRef") else {
            log::debug!("Dropping inline fact {} without contextRef", name);
            return None;
        };

        let scope = name
            .trim()
            .split_once(':')
            .and_then(|(prefix, _)| node.lookup_namespace_uri(Some(prefix)));
        let mut fact = XmlElement::new(names.provide_concept_name(name, scope));
        // Classic XBRL requires contextRef, unitRef, decimals and id unqualified.
        fact.set_attr(names.provide_name(None, "contextRef"), context_ref);
        let id = match find_node_attr_non_empty(node, "id") {
            Some(id) => id.to_string(),
            None => generated_fact_id(name, context_ref),
        };
        fact.set_attr(names.provide_name(None, "id"), id);
        if let Some(nil) = node.attribute((XSI, "nil")) {
            fact.set_attr(names.provide_name(Some(XSI), "nil"), nil);
        }
        Some(fact)
    }

    fn classic_numeric_fact(&self, node: Node<'a, 'input>, names: &mut NameProvider) -> Option<XmlElement> {
        let mut fact = self.classic_fact_element(node, names)?;
        // Unqualified on purpose, like contextRef.
        for local in ["decimals", "unitRef", "precision"] {
            if let Some(value) = find_node_attr(node, local) {
                fact.set_attr(names.provide_name(None, local), value);
            }
        }
        let text: String = node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();
        if !text.is_empty() {
            fact.push(XmlNode::Text(text));
        }
        Some(fact)
    }

    fn classic_non_numeric_fact(&self, node: Node<'a, 'input>, names: &mut NameProvider) -> Option<XmlElement> {
        let mut fact = self.classic_fact_element(node, names)?;
        let content = self.resolved_content(node, names);
        attach(&mut fact, content);
        Some(fact)
    }

    /// Inner markup of `start` and its continuations, in chain order, with
    /// excluded subtrees removed and inline wrappers unwrapped.
    pub fn resolved_content(&self, start: Node<'a, 'input>, names: &mut NameProvider) -> Vec<XmlNode> {
        let mut nodes = Vec::new();
        for fragment in ContinuationChain::new(start, &self.continuations) {
            nodes.extend(children_from_source(fragment, names));
        }
        merge_text(unwrap_inline(strip_excluded(nodes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_fact_id_is_stable() {
        let a = generated_fact_id("us-gaap:Cash", "C1");
        let b = generated_fact_id("us-gaap:Cash", "C1");
        let c = generated_fact_id("us-gaap:Cash", "C2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
    }

    #[test]
    fn test_decode_requires_html() {
        let doc = parse_document("<xbrl/>").unwrap();
        assert!(matches!(
            Document::decode(&doc),
            Err(XbrlError::MissingElement("html"))
        ));
    }

    #[test]
    fn test_attach_plain_text() {
        let mut fact = XmlElement::new("dei:Name");
        attach(
            &mut fact,
            vec![XmlNode::Text("Acme ".to_string()), XmlNode::Text("Corp".to_string())],
        );
        assert_eq!(fact.children, vec![XmlNode::Text("Acme Corp".to_string())]);
    }
}
