//! Owned output tree for the classic instance, built from source nodes and
//! written out with quick-xml.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};

use crate::attr::{NameProvider, XBRLDI, XBRLI};
use crate::error::{Result, XbrlError};

#[derive(Clone, Debug, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Name without its prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, node: XmlNode) {
        self.children.push(node);
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        text_of(&self.children)
    }

    /// Every element and attribute name in this subtree.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.name.as_str());
        out.extend(self.attrs.iter().map(|(n, _)| n.as_str()));
        for child in self.child_elements() {
            child.collect_names(out);
        }
    }
}

pub fn text_of(nodes: &[XmlNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            XmlNode::Text(t) => out.push_str(t),
            XmlNode::Element(e) => out.push_str(&e.text()),
        }
    }
    out
}

pub fn is_plain_text(nodes: &[XmlNode]) -> bool {
    nodes.iter().all(|n| matches!(n, XmlNode::Text(_)))
}

fn is_qname_valued(space: Option<&str>, local: &str) -> bool {
    matches!((space, local), (Some(XBRLI), "measure") | (Some(XBRLDI), "explicitMember"))
}

fn qname_value(node: roxmltree::Node<'_, '_>, value: &str, names: &mut NameProvider) -> String {
    match value.trim().split_once(':') {
        Some((prefix, _)) => {
            let scope = node.lookup_namespace_uri(Some(prefix));
            names.provide_qname_value(value, scope)
        }
        None => value.trim().to_string(),
    }
}

/// Copies a source node into the output tree, naming every element and
/// attribute through `names`. Comments and processing instructions are
/// dropped.
pub fn from_source(node: roxmltree::Node<'_, '_>, names: &mut NameProvider) -> Option<XmlNode> {
    if node.is_text() {
        return node.text().map(|t| XmlNode::Text(t.to_string()));
    }
    if !node.is_element() {
        return None;
    }

    let tag = node.tag_name();
    let space = tag.namespace();
    let hint = space.and_then(|uri| node.lookup_prefix(uri));
    let mut element = XmlElement::new(names.provide_name_with_hint(space, tag.name(), hint));

    for attr in node.attributes() {
        let attr_hint = attr.namespace().and_then(|uri| node.lookup_prefix(uri));
        let name = names.provide_name_with_hint(attr.namespace(), attr.name(), attr_hint);
        let value = if attr.name() == "dimension" && space == Some(XBRLDI) {
            qname_value(node, attr.value(), names)
        } else {
            attr.value().to_string()
        };
        element.attrs.push((name, value));
    }

    if is_qname_valued(space, tag.name()) {
        let text: String = node
            .children()
            .filter(|c| c.is_text())
            .filter_map(|c| c.text())
            .collect();
        element.push(XmlNode::Text(qname_value(node, &text, names)));
    } else {
        element.children = children_from_source(node, names);
    }

    Some(XmlNode::Element(element))
}

/// Inner markup of a source node as output nodes.
pub fn children_from_source(node: roxmltree::Node<'_, '_>, names: &mut NameProvider) -> Vec<XmlNode> {
    node.children()
        .filter_map(|child| from_source(child, names))
        .collect()
}

#[derive(Debug, Default)]
pub struct XmlDocument {
    root: Option<XmlElement>,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_root(&mut self, root: XmlElement) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<&XmlElement> {
        self.root.as_ref()
    }

    pub fn to_bytes(&self, indent: bool) -> Result<Vec<u8>> {
        let root = self.root.as_ref().ok_or(XbrlError::MissingElement("xbrl"))?;
        let mut writer = if indent {
            Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2)
        } else {
            Writer::new(Cursor::new(Vec::new()))
        };
        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        write_element(&mut writer, root)?;
        Ok(writer.into_inner().into_inner())
    }
}

/// Serialises a node list without a declaration or enclosing element.
pub fn fragment_to_string(nodes: &[XmlNode]) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    for node in nodes {
        match node {
            XmlNode::Element(e) => write_element(&mut writer, e)?,
            XmlNode::Text(t) if t.is_empty() => {}
            XmlNode::Text(t) => write_event(&mut writer, Event::Text(BytesText::new(t)))?,
        }
    }
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| XbrlError::Serialization(e.to_string()))
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| XbrlError::Serialization(e.to_string()))
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attrs {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    write_event(writer, Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) if t.is_empty() => {}
            XmlNode::Text(t) => write_event(writer, Event::Text(BytesText::new(t)))?,
        }
    }
    write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{ISO4217, XLINK};

    #[test]
    fn test_from_source_normalizes_names() {
        let text = format!(
            r#"<xbrli:unit xmlns:xbrli="{}" xmlns:iso4217="{}" id="USD"><xbrli:measure> iso4217:USD </xbrli:measure></xbrli:unit>"#,
            XBRLI, ISO4217
        );
        let doc = roxmltree::Document::parse(&text).unwrap();
        let mut names = NameProvider::new(vec![(Some("xbrli"), XBRLI)]);
        let unit = match from_source(doc.root_element(), &mut names) {
            Some(XmlNode::Element(e)) => e,
            other => panic!("expected element, got {:?}", other),
        };
        assert_eq!(unit.name, "xbrli:unit");
        assert_eq!(unit.attr("id"), Some("USD"));
        let measure = unit.child_elements().next().unwrap();
        assert_eq!(measure.name, "xbrli:measure");
        assert_eq!(measure.text(), "iso4217:USD");
        assert_eq!(names.uri_for_prefix("iso4217"), Some(ISO4217));
    }

    #[test]
    fn test_to_bytes_requires_root() {
        let doc = XmlDocument::new();
        assert!(matches!(doc.to_bytes(false), Err(XbrlError::MissingElement("xbrl"))));
    }

    #[test]
    fn test_to_bytes_escapes_and_parses_back() {
        let mut root = XmlElement::new("xbrli:xbrl");
        root.set_attr("xmlns:xbrli", XBRLI);
        root.set_attr("xmlns:xlink", XLINK);
        let mut child = XmlElement::new("xbrli:note");
        child.set_attr("xlink:title", "a < b & \"c\"");
        child.push(XmlNode::Text("1 < 2 & 3".to_string()));
        root.push(XmlNode::Element(child));
        root.push(XmlNode::Element(XmlElement::new("xbrli:empty")));

        let mut doc = XmlDocument::new();
        doc.set_root(root);
        let bytes = doc.to_bytes(false).unwrap();
        let out = String::from_utf8(bytes).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(out.contains("<xbrli:empty/>"));

        let parsed = roxmltree::Document::parse(&out).unwrap();
        let note = parsed
            .descendants()
            .find(|n| n.has_tag_name((XBRLI, "note")))
            .unwrap();
        assert_eq!(note.text(), Some("1 < 2 & 3"));
        assert_eq!(note.attribute((XLINK, "title")), Some("a < b & \"c\""));
    }

    #[test]
    fn test_fragment_to_string() {
        let mut bold = XmlElement::new("b");
        bold.push(XmlNode::Text("x & y".to_string()));
        let nodes = vec![
            XmlNode::Text("hello ".to_string()),
            XmlNode::Element(bold),
            XmlNode::Element(XmlElement::new("br")),
        ];
        assert_eq!(fragment_to_string(&nodes).unwrap(), "hello <b>x &amp; y</b><br/>");
        assert_eq!(fragment_to_string(&[]).unwrap(), "");
    }

    #[test]
    fn test_names_walks_subtree() {
        let mut root = XmlElement::new("a:root");
        root.set_attr("b:attr", "1");
        let mut child = XmlElement::new("c:child");
        child.push(XmlNode::Text("text".to_string()));
        root.push(XmlNode::Element(child));
        assert_eq!(root.names(), vec!["a:root", "b:attr", "c:child"]);
        assert_eq!(root.text(), "text");
    }
}
