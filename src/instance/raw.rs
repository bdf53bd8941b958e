//! Raw fragments of a classic instance document, as handed to the
//! hydrator. Nothing here is validated: every child list may be empty and
//! every attribute may be missing.

use serde::{Deserialize, Serialize};

use crate::attr::{find_attr_ns, Attr, NameProvider, QName, LINK, XBRLDI, XBRLI, XLINK};
use crate::error::Result;
use crate::inline::tree::{children_from_source, fragment_to_string};
use crate::source::{decode_utf8, parse_document};

type Node<'a, 'input> = roxmltree::Node<'a, 'input>;

/// Any element: its name, attributes, direct character data and inner
/// markup as written in the source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawElement {
    pub name: QName,
    pub prefix: Option<String>,
    pub attrs: Vec<Attr>,
    pub char_data: String,
    pub xml_inner: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDimensionContext {
    pub explicit_members: Vec<RawElement>,
    pub typed_members: Vec<RawElement>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    pub identifier: Vec<RawElement>,
    pub segment: Vec<RawDimensionContext>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPeriod {
    pub instant: Vec<RawElement>,
    pub start_date: Vec<RawElement>,
    pub end_date: Vec<RawElement>,
    pub forever: Vec<RawElement>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContext {
    pub name: QName,
    pub attrs: Vec<Attr>,
    pub entity: Vec<RawEntity>,
    pub period: Vec<RawPeriod>,
    pub scenario: Vec<RawDimensionContext>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMeasures {
    pub measures: Vec<RawElement>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDivide {
    pub numerator: Vec<RawMeasures>,
    pub denominator: Vec<RawMeasures>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUnit {
    pub name: QName,
    pub attrs: Vec<Attr>,
    pub measures: Vec<RawElement>,
    pub divide: Vec<RawDivide>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFootnoteLink {
    pub name: QName,
    pub attrs: Vec<Attr>,
    pub locs: Vec<RawElement>,
    pub footnotes: Vec<RawElement>,
    pub arcs: Vec<RawElement>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceFile {
    pub schema_refs: Vec<RawElement>,
    pub contexts: Vec<RawContext>,
    pub units: Vec<RawUnit>,
    pub facts: Vec<RawElement>,
    pub footnote_links: Vec<RawFootnoteLink>,
}

impl InstanceFile {
    /// `xlink:href` of each schema reference, in document order.
    pub fn schema_hrefs(&self) -> Vec<&str> {
        self.schema_refs
            .iter()
            .filter_map(|r| find_attr_ns(&r.attrs, XLINK, "href"))
            .map(|a| a.value.as_str())
            .collect()
    }
}

fn qname(node: Node<'_, '_>) -> QName {
    let tag = node.tag_name();
    QName::new(tag.namespace().unwrap_or(""), tag.name())
}

fn attrs(node: Node<'_, '_>) -> Vec<Attr> {
    node.attributes().map(Attr::from).collect()
}

fn char_data(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect()
}

/// Inner markup re-serialised from the parsed children. Entity-expanded
/// nodes carry ranges inside the DTD, so the source text cannot be sliced.
fn xml_inner(node: Node<'_, '_>) -> String {
    let mut names = NameProvider::new(node.namespaces().map(|ns| (ns.name(), ns.uri())));
    let children = children_from_source(node, &mut names);
    fragment_to_string(&children).unwrap_or_else(|e| {
        log::debug!("Dropping inner markup of {}: {}", qname(node), e);
        String::new()
    })
}

fn raw_element(node: Node<'_, '_>) -> RawElement {
    let name = qname(node);
    let prefix = node
        .tag_name()
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
        .map(str::to_string);
    RawElement {
        name,
        prefix,
        attrs: attrs(node),
        char_data: char_data(node),
        xml_inner: xml_inner(node),
    }
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    space: &'a str,
    local: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |c| c.is_element() && c.has_tag_name((space, local)))
}

fn raw_dimension_context(node: Node<'_, '_>) -> RawDimensionContext {
    RawDimensionContext {
        explicit_members: children(node, XBRLDI, "explicitMember").map(raw_element).collect(),
        typed_members: children(node, XBRLDI, "typedMember").map(raw_element).collect(),
    }
}

fn raw_context(node: Node<'_, '_>) -> RawContext {
    RawContext {
        name: qname(node),
        attrs: attrs(node),
        entity: children(node, XBRLI, "entity")
            .map(|entity| RawEntity {
                identifier: children(entity, XBRLI, "identifier").map(raw_element).collect(),
                segment: children(entity, XBRLI, "segment").map(raw_dimension_context).collect(),
            })
            .collect(),
        period: children(node, XBRLI, "period")
            .map(|period| RawPeriod {
                instant: children(period, XBRLI, "instant").map(raw_element).collect(),
                start_date: children(period, XBRLI, "startDate").map(raw_element).collect(),
                end_date: children(period, XBRLI, "endDate").map(raw_element).collect(),
                forever: children(period, XBRLI, "forever").map(raw_element).collect(),
            })
            .collect(),
        scenario: children(node, XBRLI, "scenario").map(raw_dimension_context).collect(),
    }
}

fn raw_measures(node: Node<'_, '_>) -> RawMeasures {
    RawMeasures {
        measures: children(node, XBRLI, "measure").map(raw_element).collect(),
    }
}

fn raw_unit(node: Node<'_, '_>) -> RawUnit {
    RawUnit {
        name: qname(node),
        attrs: attrs(node),
        measures: children(node, XBRLI, "measure").map(raw_element).collect(),
        divide: children(node, XBRLI, "divide")
            .map(|divide| RawDivide {
                numerator: children(divide, XBRLI, "unitNumerator").map(raw_measures).collect(),
                denominator: children(divide, XBRLI, "unitDenominator").map(raw_measures).collect(),
            })
            .collect(),
    }
}

fn raw_footnote_link(node: Node<'_, '_>) -> RawFootnoteLink {
    RawFootnoteLink {
        name: qname(node),
        attrs: attrs(node),
        locs: children(node, LINK, "loc").map(raw_element).collect(),
        footnotes: children(node, LINK, "footnote").map(raw_element).collect(),
        arcs: children(node, LINK, "footnoteArc").map(raw_element).collect(),
    }
}

/// Splits a classic instance into raw fragments. Every namespaced child of
/// the root outside the instance and linkbase namespaces counts as a fact.
pub fn decode_instance_file(raw: &[u8]) -> Result<InstanceFile> {
    let text = decode_utf8(raw)?;
    let doc = parse_document(text)?;
    let mut file = InstanceFile::default();

    for node in doc.root_element().children().filter(|n| n.is_element()) {
        let tag = node.tag_name();
        match (tag.namespace(), tag.name()) {
            (Some(LINK), "schemaRef") => file.schema_refs.push(raw_element(node)),
            (Some(LINK), "footnoteLink") => file.footnote_links.push(raw_footnote_link(node)),
            (Some(XBRLI), "context") => file.contexts.push(raw_context(node)),
            (Some(XBRLI), "unit") => file.units.push(raw_unit(node)),
            (Some(LINK), _) | (Some(XBRLI), _) | (None, _) => {
                log::debug!("Ignoring root child {}", qname(node));
            }
            (Some(_), _) => file.facts.push(raw_element(node)),
        }
    }

    log::debug!(
        "Decoded instance: {} contexts, {} units, {} facts, {} footnote links",
        file.contexts.len(),
        file.units.len(),
        file.facts.len(),
        file.footnote_links.len()
    );
    Ok(file)
}
