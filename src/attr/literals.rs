//! Namespace, role and arcrole URIs checked against while hydrating and
//! rewriting instance documents.

pub const UTR: &str = "http://www.xbrl.org/utr/utr.xml";
pub const LRR: &str = "http://www.xbrl.org/2003/xbrl-role-2003-07-31.xsd";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
pub const XHTML: &str = "http://www.w3.org/1999/xhtml";
pub const XLINK: &str = "http://www.w3.org/1999/xlink";
pub const XBRLI: &str = "http://www.xbrl.org/2003/instance";
pub const XBRLDT: &str = "http://xbrl.org/2005/xbrldt";
pub const XBRLDI: &str = "http://xbrl.org/2006/xbrldi";
pub const LINK: &str = "http://www.xbrl.org/2003/linkbase";
pub const ISO4217: &str = "http://www.xbrl.org/2003/iso4217";

// Inline XBRL 1.1 and 1.0
pub const IX: &str = "http://www.xbrl.org/2013/inlineXBRL";
pub const IX_2008: &str = "http://www.xbrl.org/2008/inlineXBRL";
pub const IXT: &str = "http://www.xbrl.org/inlineXBRL/transformation/2020-02-12";

pub const LINKARCROLE: &str = "http://www.w3.org/1999/xlink/properties/linkbase";
pub const ROLELINK: &str = "http://www.xbrl.org/2003/role/link";
pub const ROLEFOOTNOTE: &str = "http://www.xbrl.org/2003/role/footnote";
pub const FACT_FOOTNOTE_ARCROLE: &str = "http://www.xbrl.org/2003/arcrole/fact-footnote";
pub const NONNUM: &str = "http://www.xbrl.org/dtr/type/non-numeric";
pub const NUM: &str = "http://www.xbrl.org/dtr/type/numeric";

pub const LABEL_LINKBASE_REF: &str = "http://www.xbrl.org/2003/role/labelLinkbaseRef";
pub const CALCULATION_LINKBASE_REF: &str = "http://www.xbrl.org/2003/role/calculationLinkbaseRef";
pub const DEFINITION_LINKBASE_REF: &str = "http://www.xbrl.org/2003/role/definitionLinkbaseRef";
pub const PRESENTATION_LINKBASE_REF: &str = "http://www.xbrl.org/2003/role/presentationLinkbaseRef";
pub const REFERENCE_LINKBASE_REF: &str = "http://www.xbrl.org/2003/role/referenceLinkbaseRef";

pub const PRESENTATION_ARCROLE: &str = "http://www.xbrl.org/2003/arcrole/parent-child";
pub const CALCULATION_ARCROLE: &str = "http://www.xbrl.org/2003/arcrole/summation-item";
pub const LABEL_ARCROLE: &str = "http://www.xbrl.org/2003/arcrole/concept-label";
pub const REFERENCE_ARCROLE: &str = "http://www.xbrl.org/2003/arcrole/concept-reference";

// Dimensional arcroles
pub const DOMAIN_MEMBER_ARCROLE: &str = "http://xbrl.org/int/dim/arcrole/domain-member";
pub const DIMENSION_DOMAIN_ARCROLE: &str = "http://xbrl.org/int/dim/arcrole/dimension-domain";
pub const DIMENSION_DEFAULT_ARCROLE: &str = "http://xbrl.org/int/dim/arcrole/dimension-default";
pub const HYPERCUBE_DIMENSION_ARCROLE: &str = "http://xbrl.org/int/dim/arcrole/hypercube-dimension";
pub const HAS_INCLUSIVE_HYPERCUBE_ARCROLE: &str = "http://xbrl.org/int/dim/arcrole/all";
pub const HAS_EXCLUSIVE_HYPERCUBE_ARCROLE: &str = "http://xbrl.org/int/dim/arcrole/notAll";

// Label roles
pub const LABEL: &str = "http://www.xbrl.org/2003/role/label";
pub const VERBOSE_LABEL: &str = "http://www.xbrl.org/2003/role/verboseLabel";
pub const TERSE_LABEL: &str = "http://www.xbrl.org/2003/role/terseLabel";
pub const TOTAL_LABEL: &str = "http://www.xbrl.org/2003/role/totalLabel";
pub const PERIOD_END_LABEL: &str = "http://www.xbrl.org/2003/role/periodEndLabel";
pub const PERIOD_START_LABEL: &str = "http://www.xbrl.org/2003/role/periodStartLabel";
pub const NEGATED_LABEL: &str = "http://www.xbrl.org/2009/role/negatedLabel";
pub const NEGATED_TERSE_LABEL: &str = "http://www.xbrl.org/2009/role/negatedTerseLabel";
pub const NEGATED_TOTAL_LABEL: &str = "http://www.xbrl.org/2009/role/negatedTotalLabel";
pub const POSITIVE_LABEL: &str = "http://www.xbrl.org/2003/role/positiveLabel";
pub const POSITIVE_TERSE_LABEL: &str = "http://www.xbrl.org/2003/role/positiveTerseLabel";
pub const POSITIVE_VERBOSE_LABEL: &str = "http://www.xbrl.org/2003/role/positiveVerboseLabel";
pub const DOCUMENTATION: &str = "http://www.xbrl.org/2003/role/documentation";
pub const DEFINITION_GUIDANCE: &str = "http://www.xbrl.org/2003/role/definitionGuidance";
pub const DISCLOSURE_GUIDANCE: &str = "http://www.xbrl.org/2003/role/disclosureGuidance";
pub const PRESENTATION_GUIDANCE: &str = "http://www.xbrl.org/2003/role/presentationGuidance";
pub const MEASUREMENT_GUIDANCE: &str = "http://www.xbrl.org/2003/role/measurementGuidance";
pub const COMMENTARY: &str = "http://www.xbrl.org/2003/role/commentary";
pub const EXAMPLE: &str = "http://www.xbrl.org/2003/role/example";

pub const PERCENT_ITEM_TYPE: &str = "percentItemType";
pub const TEXT_BLOCK_ITEM_TYPE: &str = "textBlockItemType";

/// True for either inline XBRL namespace.
pub fn is_inline_namespace(uri: &str) -> bool {
    uri == IX || uri == IX_2008
}
