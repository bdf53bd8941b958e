use serde::{Deserialize, Serialize};

use crate::attr::QName;

/// A hydrated instance. Contexts, units and facts are sorted by id,
/// footnote links by title.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub file_name: String,
    pub contexts: Vec<Context>,
    pub units: Vec<Unit>,
    pub facts: Vec<Fact>,
    pub footnote_links: Vec<FootnoteLink>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    pub entity: Entity,
    pub period: Option<Period>,
    pub scenario: Option<DimensionContext>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub identifier: Identifier,
    pub segment: Option<DimensionContext>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub scheme: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionContext {
    pub explicit_members: Vec<ExplicitMember>,
    pub typed_members: Vec<TypedMember>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplicitMember {
    pub dimension: String,
    pub member: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypedMember {
    pub dimension: String,
    pub xml_inner: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Instant(String),
    Duration { start_date: String, end_date: String },
    Forever,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub kind: UnitKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Measure(String),
    Divide { numerator: String, denominator: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub name: QName,
    /// `prefix:local` as written in the source, when a prefix was in scope.
    pub prefixed_name: Option<String>,
    /// Schema anchor of the concept. Needs taxonomy discovery, so hydration
    /// leaves it unset.
    pub href: Option<String>,
    pub context_ref: String,
    pub unit_ref: String,
    pub decimals: String,
    pub precision: String,
    pub xml_inner: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FootnoteLink {
    pub title: String,
    pub footnotes: Vec<Footnote>,
    pub locs: Vec<FootnoteLoc>,
    pub arcs: Vec<FootnoteArc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    pub id: String,
    pub label: String,
    pub lang: String,
    pub char_data: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FootnoteLoc {
    pub href: String,
    pub label: String,
}

/// An arc between a locator and a footnote of the same link, held as
/// indices into that link's `locs` and `footnotes`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FootnoteArc {
    pub from: String,
    pub to: String,
    pub loc: usize,
    pub footnote: usize,
}

impl Instance {
    pub fn context(&self, id: &str) -> Option<&Context> {
        self.contexts
            .binary_search_by(|c| c.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.contexts[i])
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units
            .binary_search_by(|u| u.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.units[i])
    }

    pub fn fact(&self, id: &str) -> Option<&Fact> {
        self.facts
            .binary_search_by(|f| f.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.facts[i])
    }

    pub fn fact_context(&self, fact: &Fact) -> Option<&Context> {
        self.context(&fact.context_ref)
    }

    pub fn fact_unit(&self, fact: &Fact) -> Option<&Unit> {
        self.unit(&fact.unit_ref)
    }

    /// Footnotes reached from the fact with `fact_id` through a `#id`
    /// locator, across all links.
    pub fn footnotes_for(&self, fact_id: &str) -> Vec<&Footnote> {
        let href = format!("#{}", fact_id);
        self.footnote_links
            .iter()
            .flat_map(|link| {
                let href = href.clone();
                link.arcs.iter().filter_map(move |arc| {
                    let loc = link.arc_loc(arc)?;
                    if loc.href.ends_with(&href) {
                        link.arc_footnote(arc)
                    } else {
                        None
                    }
                })
            })
            .collect()
    }
}

impl FootnoteLink {
    pub fn loc(&self, label: &str) -> Option<&FootnoteLoc> {
        self.locs.iter().find(|l| l.label == label)
    }

    pub fn footnote(&self, label: &str) -> Option<&Footnote> {
        self.footnotes.iter().find(|f| f.label == label)
    }

    pub fn arc_loc(&self, arc: &FootnoteArc) -> Option<&FootnoteLoc> {
        self.locs.get(arc.loc)
    }

    pub fn arc_footnote(&self, arc: &FootnoteArc) -> Option<&Footnote> {
        self.footnotes.get(arc.footnote)
    }
}
