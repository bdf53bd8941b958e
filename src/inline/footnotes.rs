use std::collections::HashSet;

use super::tree::{XmlElement, XmlNode};
use super::{attach, Document, Node};
use crate::attr::{
    find_node_attr, find_node_attr_non_empty, NameProvider, FACT_FOOTNOTE_ARCROLE, LINK,
    ROLEFOOTNOTE, ROLELINK, XLINK, XML,
};

impl<'a, 'input> Document<'a, 'input> {
    /// Rebuilds one `footnoteLink` from the inline relationships.
    ///
    /// Each relationship lists fact ids in `fromRefs` and footnote ids in
    /// `toRefs`. Every pair whose footnote exists and whose fact is indexed
    /// yields an arc; each fact gets one locator and each footnote one
    /// resource, however many relationships mention them. A footnote no
    /// arc reaches is left out. `None` when nothing survives.
    pub(super) fn classic_footnote_link(&self, names: &mut NameProvider) -> Option<XmlElement> {
        let mut link = XmlElement::new(names.provide_name(Some(LINK), "footnoteLink"));
        link.set_attr(names.provide_name(Some(XLINK), "type"), "extended");
        link.set_attr(names.provide_name(Some(XLINK), "role"), ROLELINK);

        let mut emitted_locs: HashSet<&str> = HashSet::new();
        let mut emitted_arcs: HashSet<(&str, &str)> = HashSet::new();
        let mut emitted_footnotes: HashSet<&str> = HashSet::new();

        for relationship in &self.footnote_relationships {
            let Some(to_refs) = find_node_attr_non_empty(*relationship, "toRefs") else {
                log::debug!("Skipping footnote relationship without toRefs");
                continue;
            };
            let Some(from_refs) = find_node_attr_non_empty(*relationship, "fromRefs") else {
                log::debug!("Skipping footnote relationship without fromRefs");
                continue;
            };

            for to_id in to_refs.split_whitespace() {
                let Some(footnote) = self.footnotes.get(to_id) else {
                    log::debug!("Footnote {} not found", to_id);
                    continue;
                };

                let mut locs = Vec::new();
                let mut arcs = Vec::new();
                for from_id in from_refs.split_whitespace() {
                    if !self.has_fact(from_id) {
                        log::debug!("Fact {} not found for footnote {}", from_id, to_id);
                        continue;
                    }
                    if !emitted_arcs.insert((from_id, to_id)) {
                        continue;
                    }
                    if emitted_locs.insert(from_id) {
                        locs.push(classic_loc(from_id, names));
                    }
                    arcs.push(classic_arc(from_id, to_id, names));
                }
                if arcs.is_empty() {
                    continue;
                }

                link.children.extend(locs.into_iter().map(XmlNode::Element));
                link.children.extend(arcs.into_iter().map(XmlNode::Element));
                if emitted_footnotes.insert(to_id) {
                    let resource = self.classic_footnote(*footnote, to_id, names);
                    link.push(XmlNode::Element(resource));
                }
            }
        }

        if link.children.is_empty() {
            None
        } else {
            Some(link)
        }
    }

    fn classic_footnote(&self, footnote: Node<'a, 'input>, id: &str, names: &mut NameProvider) -> XmlElement {
        let mut resource = XmlElement::new(names.provide_name(Some(LINK), "footnote"));
        resource.set_attr(names.provide_name(None, "id"), id);
        resource.set_attr(names.provide_name(Some(XLINK), "type"), "resource");
        resource.set_attr(names.provide_name(Some(XLINK), "label"), id);
        let role = find_node_attr(footnote, "footnoteRole").unwrap_or(ROLEFOOTNOTE);
        resource.set_attr(names.provide_name(Some(XLINK), "role"), role);
        if let Some(lang) = footnote.ancestors().find_map(|n| n.attribute((XML, "lang"))) {
            resource.set_attr(names.provide_name(Some(XML), "lang"), lang);
        }
        let content = self.resolved_content(footnote, names);
        attach(&mut resource, content);
        resource
    }
}

fn classic_loc(fact_id: &str, names: &mut NameProvider) -> XmlElement {
    let mut loc = XmlElement::new(names.provide_name(Some(LINK), "loc"));
    loc.set_attr(names.provide_name(Some(XLINK), "type"), "locator");
    loc.set_attr(names.provide_name(Some(XLINK), "href"), format!("#{}", fact_id));
    loc.set_attr(names.provide_name(Some(XLINK), "label"), fact_id);
    loc
}

fn classic_arc(from: &str, to: &str, names: &mut NameProvider) -> XmlElement {
    let mut arc = XmlElement::new(names.provide_name(Some(LINK), "footnoteArc"));
    arc.set_attr(names.provide_name(Some(XLINK), "type"), "arc");
    arc.set_attr(names.provide_name(Some(XLINK), "arcrole"), FACT_FOOTNOTE_ARCROLE);
    arc.set_attr(names.provide_name(Some(XLINK), "from"), from);
    arc.set_attr(names.provide_name(Some(XLINK), "to"), to);
    arc
}
