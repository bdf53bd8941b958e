//! Raw fragments to the validated instance model.
//!
//! Hydration is fail-soft: a record missing a required field, in the wrong
//! namespace, or pointing at something that does not resolve is left out
//! and logged at debug level. Only an absent input or an empty file name
//! is an error.

use super::model::{
    Context, DimensionContext, Entity, ExplicitMember, Fact, Footnote, FootnoteArc, FootnoteLink,
    FootnoteLoc, Identifier, Instance, Period, TypedMember, Unit, UnitKind,
};
use super::raw::{
    decode_instance_file, InstanceFile, RawContext, RawDimensionContext, RawElement,
    RawFootnoteLink, RawMeasures, RawUnit,
};
use crate::attr::{find_attr, Attr, FACT_FOOTNOTE_ARCROLE, LINK, ROLELINK, XBRLI};
use crate::error::{Result, XbrlError};

pub fn hydrate(raw_file: Option<&InstanceFile>, file_name: &str) -> Result<Instance> {
    if file_name.is_empty() {
        return Err(XbrlError::InvalidInput("empty file name".to_string()));
    }
    let file = raw_file.ok_or_else(|| XbrlError::InvalidInput("empty file".to_string()))?;

    let instance = Instance {
        file_name: file_name.to_string(),
        contexts: hydrate_contexts(file),
        units: hydrate_units(file),
        facts: hydrate_facts(file),
        footnote_links: hydrate_footnote_links(file),
    };
    log::debug!(
        "Hydrated {}: {}/{} contexts, {}/{} units, {}/{} facts, {}/{} footnote links",
        file_name,
        instance.contexts.len(),
        file.contexts.len(),
        instance.units.len(),
        file.units.len(),
        instance.facts.len(),
        file.facts.len(),
        instance.footnote_links.len(),
        file.footnote_links.len()
    );
    Ok(instance)
}

/// Decodes a classic instance document and hydrates it.
pub fn hydrate_bytes(raw: &[u8], file_name: &str) -> Result<Instance> {
    if file_name.is_empty() {
        return Err(XbrlError::InvalidInput("empty file name".to_string()));
    }
    let file = decode_instance_file(raw)?;
    hydrate(Some(&file), file_name)
}

/// Attribute value when present and not blank.
fn attr_value<'a>(attrs: &'a [Attr], local: &str) -> Option<&'a str> {
    find_attr(attrs, local)
        .map(|a| a.value.as_str())
        .filter(|v| !v.trim().is_empty())
}

fn attr_equals(attrs: &[Attr], local: &str, expected: &str) -> bool {
    find_attr(attrs, local).is_some_and(|a| a.value.trim() == expected)
}

/// Keeps the first record per key; input must already be sorted by key.
fn dedup_sorted<T>(items: &mut Vec<T>, key: impl Fn(&T) -> &str, kind: &str) {
    let before = items.len();
    items.dedup_by(|b, a| key(&*a) == key(&*b));
    if items.len() != before {
        log::debug!("Dropped {} duplicate {} ids", before - items.len(), kind);
    }
}

fn hydrate_dimension_context(raw: &RawDimensionContext) -> DimensionContext {
    let explicit_members = raw
        .explicit_members
        .iter()
        .filter_map(|member| {
            let Some(dimension) = attr_value(&member.attrs, "dimension") else {
                log::debug!("Dropping explicit member without dimension");
                return None;
            };
            Some(ExplicitMember {
                dimension: dimension.to_string(),
                member: member.char_data.trim().to_string(),
            })
        })
        .collect();
    let typed_members = raw
        .typed_members
        .iter()
        .filter_map(|member| {
            let Some(dimension) = attr_value(&member.attrs, "dimension") else {
                log::debug!("Dropping typed member without dimension");
                return None;
            };
            Some(TypedMember {
                dimension: dimension.to_string(),
                xml_inner: member.xml_inner.clone(),
            })
        })
        .collect();
    DimensionContext {
        explicit_members,
        typed_members,
    }
}

fn first_text(elements: &[RawElement]) -> Option<String> {
    elements.first().map(|e| e.char_data.trim().to_string())
}

fn hydrate_period(context: &RawContext, id: &str) -> Option<Period> {
    let period = context.period.first()?;
    let instant = first_text(&period.instant);
    let duration = first_text(&period.start_date).zip(first_text(&period.end_date));
    match (instant, duration) {
        (Some(instant), duration) => {
            if duration.is_some() {
                log::debug!("Context {} has both instant and duration; using instant", id);
            }
            Some(Period::Instant(instant))
        }
        (None, Some((start_date, end_date))) => Some(Period::Duration {
            start_date,
            end_date,
        }),
        (None, None) if !period.forever.is_empty() => Some(Period::Forever),
        (None, None) => None,
    }
}

fn hydrate_context(context: &RawContext) -> Option<Context> {
    if context.name.space != XBRLI {
        log::debug!("Dropping context in namespace {:?}", context.name.space);
        return None;
    }
    let Some(id) = attr_value(&context.attrs, "id") else {
        log::debug!("Dropping context without id");
        return None;
    };
    let Some(entity) = context.entity.first() else {
        log::debug!("Dropping context {}: no entity", id);
        return None;
    };
    let Some(identifier) = entity.identifier.first() else {
        log::debug!("Dropping context {}: no entity identifier", id);
        return None;
    };
    let value = identifier.char_data.trim();
    if value.is_empty() {
        log::debug!("Dropping context {}: empty entity identifier", id);
        return None;
    }
    let Some(scheme) = find_attr(&identifier.attrs, "scheme") else {
        log::debug!("Dropping context {}: identifier without scheme", id);
        return None;
    };

    Some(Context {
        id: id.to_string(),
        entity: Entity {
            identifier: Identifier {
                scheme: scheme.value.clone(),
                value: value.to_string(),
            },
            segment: entity.segment.first().map(hydrate_dimension_context),
        },
        period: hydrate_period(context, id),
        scenario: context.scenario.first().map(hydrate_dimension_context),
    })
}

fn hydrate_contexts(file: &InstanceFile) -> Vec<Context> {
    let mut contexts: Vec<Context> = file.contexts.iter().filter_map(hydrate_context).collect();
    contexts.sort_by(|a, b| a.id.cmp(&b.id));
    dedup_sorted(&mut contexts, |c| c.id.as_str(), "context");
    contexts
}

fn first_measure(measures: &[RawMeasures]) -> Option<String> {
    let measure = measures.first()?.measures.first()?;
    let value = measure.char_data.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn hydrate_unit(unit: &RawUnit) -> Option<Unit> {
    if unit.name.space != XBRLI {
        log::debug!("Dropping unit in namespace {:?}", unit.name.space);
        return None;
    }
    let Some(id) = attr_value(&unit.attrs, "id") else {
        log::debug!("Dropping unit without id");
        return None;
    };

    let kind = match unit.measures.first() {
        Some(measure) => UnitKind::Measure(measure.char_data.trim().to_string()),
        None => {
            let Some(divide) = unit.divide.first() else {
                log::debug!("Dropping unit {}: no measure or divide", id);
                return None;
            };
            match (first_measure(&divide.numerator), first_measure(&divide.denominator)) {
                (Some(numerator), Some(denominator)) => UnitKind::Divide {
                    numerator,
                    denominator,
                },
                _ => {
                    log::debug!("Dropping unit {}: malformed divide", id);
                    return None;
                }
            }
        }
    };

    Some(Unit {
        id: id.to_string(),
        kind,
    })
}

fn hydrate_units(file: &InstanceFile) -> Vec<Unit> {
    let mut units: Vec<Unit> = file.units.iter().filter_map(hydrate_unit).collect();
    units.sort_by(|a, b| a.id.cmp(&b.id));
    dedup_sorted(&mut units, |u| u.id.as_str(), "unit");
    units
}

fn hydrate_fact(fact: &RawElement) -> Option<Fact> {
    if fact.name.local.is_empty() || fact.name.space.is_empty() {
        log::debug!("Dropping fact without qualified name");
        return None;
    }
    let required = ["id", "contextRef", "unitRef", "decimals", "precision"];
    let mut values = [""; 5];
    for (slot, local) in values.iter_mut().zip(required) {
        match attr_value(&fact.attrs, local) {
            Some(value) => *slot = value,
            None => {
                log::debug!("Dropping fact {}: missing {}", fact.name, local);
                return None;
            }
        }
    }
    let [id, context_ref, unit_ref, decimals, precision] = values;

    Some(Fact {
        id: id.to_string(),
        name: fact.name.clone(),
        prefixed_name: fact
            .prefix
            .as_ref()
            .map(|prefix| format!("{}:{}", prefix, fact.name.local)),
        href: None,
        context_ref: context_ref.to_string(),
        unit_ref: unit_ref.to_string(),
        decimals: decimals.to_string(),
        precision: precision.to_string(),
        xml_inner: fact.xml_inner.clone(),
    })
}

fn hydrate_facts(file: &InstanceFile) -> Vec<Fact> {
    let mut facts: Vec<Fact> = file.facts.iter().filter_map(hydrate_fact).collect();
    facts.sort_by(|a, b| a.id.cmp(&b.id));
    facts
}

fn hydrate_loc(loc: &RawElement) -> Option<FootnoteLoc> {
    if loc.name.space != LINK || !attr_equals(&loc.attrs, "type", "locator") {
        return None;
    }
    Some(FootnoteLoc {
        href: attr_value(&loc.attrs, "href")?.to_string(),
        label: attr_value(&loc.attrs, "label")?.to_string(),
    })
}

fn hydrate_footnote(footnote: &RawElement) -> Option<Footnote> {
    if footnote.name.space != LINK || !attr_equals(&footnote.attrs, "type", "resource") {
        return None;
    }
    Some(Footnote {
        id: attr_value(&footnote.attrs, "id")?.to_string(),
        label: attr_value(&footnote.attrs, "label")?.to_string(),
        lang: attr_value(&footnote.attrs, "lang")?.to_string(),
        char_data: footnote.char_data.clone(),
    })
}

fn hydrate_arc(arc: &RawElement, locs: &[FootnoteLoc], footnotes: &[Footnote]) -> Option<FootnoteArc> {
    if arc.name.space != LINK
        || !attr_equals(&arc.attrs, "arcrole", FACT_FOOTNOTE_ARCROLE)
        || !attr_equals(&arc.attrs, "type", "arc")
    {
        return None;
    }
    let from = attr_value(&arc.attrs, "from")?;
    let to = attr_value(&arc.attrs, "to")?;
    let Some(loc) = locs.iter().position(|l| l.label == from) else {
        log::debug!("Dropping footnote arc: no locator labelled {}", from);
        return None;
    };
    let Some(footnote) = footnotes.iter().position(|f| f.label == to) else {
        log::debug!("Dropping footnote arc: no footnote labelled {}", to);
        return None;
    };
    Some(FootnoteArc {
        from: from.to_string(),
        to: to.to_string(),
        loc,
        footnote,
    })
}

fn hydrate_footnote_link(link: &RawFootnoteLink) -> Option<FootnoteLink> {
    if link.name.space != LINK
        || !attr_equals(&link.attrs, "type", "extended")
        || !attr_equals(&link.attrs, "role", ROLELINK)
    {
        log::debug!("Dropping footnote link that is not a standard extended link");
        return None;
    }

    let locs: Vec<FootnoteLoc> = link.locs.iter().filter_map(hydrate_loc).collect();
    let footnotes: Vec<Footnote> = link.footnotes.iter().filter_map(hydrate_footnote).collect();
    let arcs = link
        .arcs
        .iter()
        .filter_map(|arc| hydrate_arc(arc, &locs, &footnotes))
        .collect();

    Some(FootnoteLink {
        title: find_attr(&link.attrs, "title")
            .map(|a| a.value.clone())
            .unwrap_or_default(),
        footnotes,
        locs,
        arcs,
    })
}

fn hydrate_footnote_links(file: &InstanceFile) -> Vec<FootnoteLink> {
    let mut links: Vec<FootnoteLink> = file
        .footnote_links
        .iter()
        .filter_map(hydrate_footnote_link)
        .collect();
    links.sort_by(|a, b| a.title.cmp(&b.title));
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{QName, XBRLDI};
    use crate::instance::raw::{RawDivide, RawEntity, RawPeriod};

    fn element(space: &str, local: &str, attrs: &[(&str, &str)], text: &str) -> RawElement {
        RawElement {
            name: QName::new(space, local),
            prefix: None,
            attrs: attrs.iter().map(|(k, v)| Attr::new("", k, v)).collect(),
            char_data: text.to_string(),
            xml_inner: text.to_string(),
        }
    }

    fn context(id: &str, identifier: Option<&str>) -> RawContext {
        RawContext {
            name: QName::new(XBRLI, "context"),
            attrs: vec![Attr::new("", "id", id)],
            entity: vec![RawEntity {
                identifier: identifier
                    .map(|v| element(XBRLI, "identifier", &[("scheme", "http://www.sec.gov/CIK")], v))
                    .into_iter()
                    .collect(),
                segment: vec![],
            }],
            period: vec![RawPeriod {
                instant: vec![element(XBRLI, "instant", &[], "2023-12-31")],
                ..Default::default()
            }],
            scenario: vec![],
        }
    }

    fn measure(text: &str) -> RawMeasures {
        RawMeasures {
            measures: vec![element(XBRLI, "measure", &[], text)],
        }
    }

    fn fact(id: &str, attrs: &[(&str, &str)]) -> RawElement {
        let mut all = vec![("id", id)];
        all.extend_from_slice(attrs);
        element("http://fasb.org/us-gaap/2023", "Cash", &all, "100")
    }

    const FULL_FACT: &[(&str, &str)] = &[
        ("contextRef", "C1"),
        ("unitRef", "U1"),
        ("decimals", "0"),
        ("precision", "INF"),
    ];

    #[test]
    fn test_context_without_identifier_is_dropped() {
        let file = InstanceFile {
            contexts: vec![context("C1", None)],
            ..Default::default()
        };
        let instance = hydrate(Some(&file), "a.xml").unwrap();
        assert!(instance.contexts.is_empty());
    }

    #[test]
    fn test_rejects_missing_input() {
        assert!(matches!(hydrate(None, "a.xml"), Err(XbrlError::InvalidInput(_))));
        let file = InstanceFile::default();
        assert!(matches!(hydrate(Some(&file), ""), Err(XbrlError::InvalidInput(_))));
    }

    #[test]
    fn test_contexts_sorted_and_unique() {
        let file = InstanceFile {
            contexts: vec![
                context("C2", Some("2")),
                context("C1", Some("1")),
                context("C2", Some("3")),
                context("C0", Some("  ")),
            ],
            ..Default::default()
        };
        let instance = hydrate(Some(&file), "a.xml").unwrap();
        let ids: Vec<&str> = instance.contexts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C2"]);
        assert_eq!(instance.contexts[1].entity.identifier.value, "2");
        assert_eq!(
            instance.contexts[0].period,
            Some(Period::Instant("2023-12-31".to_string()))
        );
    }

    #[test]
    fn test_instant_wins_over_duration() {
        let mut raw = context("C1", Some("1"));
        raw.period[0].start_date = vec![element(XBRLI, "startDate", &[], "2023-01-01")];
        raw.period[0].end_date = vec![element(XBRLI, "endDate", &[], "2023-12-31")];
        let hydrated = hydrate_context(&raw).unwrap();
        assert!(matches!(hydrated.period, Some(Period::Instant(_))));

        raw.period[0].instant.clear();
        let hydrated = hydrate_context(&raw).unwrap();
        assert_eq!(
            hydrated.period,
            Some(Period::Duration {
                start_date: "2023-01-01".to_string(),
                end_date: "2023-12-31".to_string(),
            })
        );
    }

    #[test]
    fn test_divide_requires_both_sides() {
        let unit = |id: &str, divide: RawDivide| RawUnit {
            name: QName::new(XBRLI, "unit"),
            attrs: vec![Attr::new("", "id", id)],
            measures: vec![],
            divide: vec![divide],
        };
        let file = InstanceFile {
            units: vec![
                unit(
                    "U2",
                    RawDivide {
                        numerator: vec![measure("iso4217:USD")],
                        denominator: vec![],
                    },
                ),
                unit(
                    "U1",
                    RawDivide {
                        numerator: vec![measure("iso4217:USD")],
                        denominator: vec![measure("xbrli:shares")],
                    },
                ),
            ],
            ..Default::default()
        };
        let instance = hydrate(Some(&file), "a.xml").unwrap();
        assert_eq!(instance.units.len(), 1);
        assert_eq!(
            instance.units[0].kind,
            UnitKind::Divide {
                numerator: "iso4217:USD".to_string(),
                denominator: "xbrli:shares".to_string(),
            }
        );
    }

    #[test]
    fn test_fact_requires_every_field() {
        let file = InstanceFile {
            facts: vec![
                fact("F2", FULL_FACT),
                fact("F1", FULL_FACT),
                fact("F3", &FULL_FACT[..3]),
                fact("F4", &[("contextRef", "C1"), ("unitRef", ""), ("decimals", "0"), ("precision", "2")]),
            ],
            ..Default::default()
        };
        let instance = hydrate(Some(&file), "a.xml").unwrap();
        let ids: Vec<&str> = instance.facts.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["F1", "F2"]);
        assert_eq!(instance.facts[0].precision, "INF");
        assert!(instance.facts[0].href.is_none());
    }

    #[test]
    fn test_arcs_resolve_within_link() {
        let xlink = |pairs: &[(&str, &str)]| -> Vec<(String, String)> {
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };
        let link_element = |local: &str, pairs: Vec<(String, String)>, text: &str| {
            let mut e = element(LINK, local, &[], text);
            e.attrs = pairs
                .iter()
                .map(|(k, v)| Attr::new(crate::attr::XLINK, k, v))
                .collect();
            e
        };
        let mut footnote = link_element(
            "footnote",
            xlink(&[("type", "resource"), ("label", "fn1")]),
            "Restated.",
        );
        footnote.attrs.push(Attr::new("", "id", "fn1"));
        footnote.attrs.push(Attr::new(crate::attr::XML, "lang", "en-US"));

        let arc = |from: &str, to: &str| {
            link_element(
                "footnoteArc",
                xlink(&[
                    ("type", "arc"),
                    ("arcrole", FACT_FOOTNOTE_ARCROLE),
                    ("from", from),
                    ("to", to),
                ]),
                "",
            )
        };
        let link = RawFootnoteLink {
            name: QName::new(LINK, "footnoteLink"),
            attrs: vec![
                Attr::new(crate::attr::XLINK, "type", "extended"),
                Attr::new(crate::attr::XLINK, "role", ROLELINK),
            ],
            locs: vec![link_element(
                "loc",
                xlink(&[("type", "locator"), ("href", "#F1"), ("label", "F1")]),
                "",
            )],
            footnotes: vec![footnote],
            arcs: vec![arc("F1", "fn1"), arc("F9", "fn1"), arc("F1", "fn9")],
        };
        let file = InstanceFile {
            facts: vec![fact("F1", FULL_FACT)],
            footnote_links: vec![link],
            ..Default::default()
        };

        let instance = hydrate(Some(&file), "a.xml").unwrap();
        let link = &instance.footnote_links[0];
        assert_eq!(link.arcs.len(), 1);
        let arc = &link.arcs[0];
        assert_eq!(link.arc_loc(arc).map(|l| l.label.as_str()), Some("F1"));
        assert_eq!(link.arc_footnote(arc).map(|f| f.lang.as_str()), Some("en-US"));

        let footnotes = instance.footnotes_for("F1");
        assert_eq!(footnotes.len(), 1);
        assert_eq!(footnotes[0].char_data, "Restated.");
    }

    #[test]
    fn test_member_without_dimension_is_dropped_alone() {
        let mut raw = context("C1", Some("1"));
        raw.entity[0].segment = vec![RawDimensionContext {
            explicit_members: vec![
                element(XBRLDI, "explicitMember", &[("dimension", "us-gaap:AxisA")], "us-gaap:MemberA"),
                element(XBRLDI, "explicitMember", &[], "us-gaap:MemberB"),
            ],
            typed_members: vec![
                element(XBRLDI, "typedMember", &[("dimension", " ")], "<v>1</v>"),
                element(XBRLDI, "typedMember", &[("dimension", "us-gaap:AxisB")], "<v>2</v>"),
            ],
        }];

        let hydrated = hydrate_context(&raw).unwrap();
        let segment = hydrated.entity.segment.unwrap();
        assert_eq!(
            segment.explicit_members,
            vec![ExplicitMember {
                dimension: "us-gaap:AxisA".to_string(),
                member: "us-gaap:MemberA".to_string(),
            }]
        );
        assert_eq!(
            segment.typed_members,
            vec![TypedMember {
                dimension: "us-gaap:AxisB".to_string(),
                xml_inner: "<v>2</v>".to_string(),
            }]
        );
    }

    #[test]
    fn test_wrong_namespace_is_dropped() {
        let mut foreign_context = context("C1", Some("1"));
        foreign_context.name = QName::new(LINK, "context");
        let unit = |space: &str, id: &str| RawUnit {
            name: QName::new(space, "unit"),
            attrs: vec![Attr::new("", "id", id)],
            measures: vec![element(XBRLI, "measure", &[], "iso4217:USD")],
            divide: vec![],
        };
        let file = InstanceFile {
            contexts: vec![foreign_context, context("C2", Some("2"))],
            units: vec![unit("http://example.com/other", "U1"), unit(XBRLI, "U2")],
            ..Default::default()
        };

        let instance = hydrate(Some(&file), "a.xml").unwrap();
        let context_ids: Vec<&str> = instance.contexts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(context_ids, vec!["C2"]);
        let unit_ids: Vec<&str> = instance.units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(unit_ids, vec!["U2"]);
        assert_eq!(
            instance.units[0].kind,
            UnitKind::Measure("iso4217:USD".to_string())
        );
    }

    #[test]
    fn test_footnote_link_requires_extended_standard_role() {
        let link = |link_type: &str, role: &str| RawFootnoteLink {
            name: QName::new(LINK, "footnoteLink"),
            attrs: vec![
                Attr::new(crate::attr::XLINK, "type", link_type),
                Attr::new(crate::attr::XLINK, "role", role),
                Attr::new(crate::attr::XLINK, "title", role),
            ],
            ..Default::default()
        };
        let file = InstanceFile {
            footnote_links: vec![
                link("simple", ROLELINK),
                link("extended", "http://example.com/role/custom"),
                link("extended", ROLELINK),
            ],
            ..Default::default()
        };

        let instance = hydrate(Some(&file), "a.xml").unwrap();
        assert_eq!(instance.footnote_links.len(), 1);
        assert_eq!(instance.footnote_links[0].title, ROLELINK);
    }

    #[test]
    fn test_forever_period() {
        let mut raw = context("C1", Some("1"));
        raw.period[0] = RawPeriod {
            forever: vec![element(XBRLI, "forever", &[], "")],
            ..Default::default()
        };
        assert_eq!(hydrate_context(&raw).unwrap().period, Some(Period::Forever));

        raw.period[0].forever.clear();
        assert_eq!(hydrate_context(&raw).unwrap().period, None);
    }

    #[test]
    fn test_hydration_is_deterministic() {
        let file = InstanceFile {
            contexts: vec![context("C2", Some("2")), context("C1", Some("1"))],
            facts: vec![fact("F2", FULL_FACT), fact("F1", FULL_FACT)],
            ..Default::default()
        };
        let first = hydrate(Some(&file), "a.xml").unwrap();
        let second = hydrate(Some(&file), "a.xml").unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
