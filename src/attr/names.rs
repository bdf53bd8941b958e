use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::literals::{ISO4217, LINK, XBRLDI, XBRLDT, XBRLI, XHTML, XLINK, XML, XSI};

static PREFERRED_PREFIXES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (XBRLI, "xbrli"),
        (LINK, "link"),
        (XLINK, "xlink"),
        (XBRLDI, "xbrldi"),
        (XBRLDT, "xbrldt"),
        (XSI, "xsi"),
        (ISO4217, "iso4217"),
        (XHTML, "xhtml"),
    ])
});

/// Allocates namespace prefixes for every name written to the output
/// document.
///
/// Prefixes declared on the source root are reused for their namespace.
/// Namespaces the source never bound get a well-known prefix when one is
/// free, otherwise `nsN`. A prefix is never bound to two namespaces, and
/// output names are always prefixed when namespaced (the default
/// namespace is not reused).
#[derive(Debug, Default)]
pub struct NameProvider {
    uri_to_prefix: HashMap<String, String>,
    prefix_to_uri: BTreeMap<String, String>,
    source_prefixes: HashMap<String, String>,
    source_default: Option<String>,
    content_prefixes: BTreeSet<String>,
}

impl NameProvider {
    /// Builds the allocator from `(prefix, uri)` declarations, `None`
    /// being the default namespace.
    pub fn new<'n>(declared: impl IntoIterator<Item = (Option<&'n str>, &'n str)>) -> Self {
        let mut provider = Self::default();
        for (prefix, uri) in declared {
            match prefix {
                Some("xml") | Some("xmlns") => continue,
                Some(prefix) => {
                    provider
                        .source_prefixes
                        .entry(prefix.to_string())
                        .or_insert_with(|| uri.to_string());
                    if !provider.uri_to_prefix.contains_key(uri)
                        && !provider.prefix_to_uri.contains_key(prefix)
                    {
                        provider.bind(prefix, uri);
                    }
                }
                None => {
                    if provider.source_default.is_none() {
                        provider.source_default = Some(uri.to_string());
                    }
                }
            }
        }
        provider
    }

    fn bind(&mut self, prefix: &str, uri: &str) {
        self.uri_to_prefix.insert(uri.to_string(), prefix.to_string());
        self.prefix_to_uri.insert(prefix.to_string(), uri.to_string());
    }

    fn is_free(&self, prefix: &str) -> bool {
        !prefix.is_empty()
            && prefix != "xml"
            && prefix != "xmlns"
            && !self.prefix_to_uri.contains_key(prefix)
    }

    fn allocate(&mut self, uri: &str, hint: Option<&str>) -> String {
        if let Some(prefix) = self.uri_to_prefix.get(uri) {
            return prefix.clone();
        }
        let preferred = PREFERRED_PREFIXES.get(uri).copied();
        for candidate in hint.into_iter().chain(preferred) {
            if self.is_free(candidate) {
                self.bind(candidate, uri);
                return candidate.to_string();
            }
        }
        let mut n = 0usize;
        loop {
            let candidate = format!("ns{}", n);
            if self.is_free(&candidate) {
                log::debug!("Allocated prefix {} for {}", candidate, uri);
                self.bind(&candidate, uri);
                return candidate;
            }
            n += 1;
        }
    }

    /// Output name for `local` in namespace `space`.
    pub fn provide_name(&mut self, space: Option<&str>, local: &str) -> String {
        self.provide_name_with_hint(space, local, None)
    }

    /// Like `provide_name`, preferring `hint` when the namespace still
    /// needs a prefix.
    pub fn provide_name_with_hint(
        &mut self,
        space: Option<&str>,
        local: &str,
        hint: Option<&str>,
    ) -> String {
        match space {
            None | Some("") => local.to_string(),
            Some(XML) => format!("xml:{}", local),
            Some(uri) => format!("{}:{}", self.allocate(uri, hint), local),
        }
    }

    /// Output name for a source `prefix:local` concept name. `scope_uri`
    /// is the namespace the prefix resolves to at the point of use, when
    /// known; otherwise the root declarations are consulted. Unresolvable
    /// names are returned unchanged.
    pub fn provide_concept_name(&mut self, qname: &str, scope_uri: Option<&str>) -> String {
        let qname = qname.trim();
        match qname.split_once(':') {
            Some((prefix, local)) => {
                let uri = scope_uri
                    .map(str::to_string)
                    .or_else(|| self.source_prefixes.get(prefix).cloned());
                match uri {
                    Some(uri) => format!("{}:{}", self.allocate(&uri, Some(prefix)), local),
                    None => {
                        log::debug!("Unresolved prefix {} in {}", prefix, qname);
                        qname.to_string()
                    }
                }
            }
            None => {
                let uri = scope_uri
                    .map(str::to_string)
                    .or_else(|| self.source_default.clone());
                match uri {
                    Some(uri) => format!("{}:{}", self.allocate(&uri, None), qname),
                    None => qname.to_string(),
                }
            }
        }
    }

    /// Normalizes a QName appearing in text or attribute content. Its
    /// prefix is declared on the output root even though no element or
    /// attribute name carries it.
    pub fn provide_qname_value(&mut self, value: &str, scope_uri: Option<&str>) -> String {
        let name = self.provide_concept_name(value, scope_uri);
        if let Some((prefix, _)) = name.split_once(':') {
            if self.prefix_to_uri.contains_key(prefix) {
                self.content_prefixes.insert(prefix.to_string());
            }
        }
        name
    }

    pub fn uri_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefix_to_uri.get(prefix).map(String::as_str)
    }

    /// Namespace declarations for the prefixes that appear in `names`
    /// (every element and attribute name of the finished output tree) plus
    /// those registered through `provide_qname_value`. Sorted by prefix.
    pub fn ns_attrs<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Vec<(String, String)> {
        let mut used: BTreeSet<String> = self.content_prefixes.clone();
        for name in names {
            if let Some((prefix, _)) = name.split_once(':') {
                used.insert(prefix.to_string());
            }
        }
        used.into_iter()
            .filter_map(|prefix| {
                self.prefix_to_uri
                    .get(&prefix)
                    .map(|uri| (format!("xmlns:{}", prefix), uri.clone()))
            })
            .collect()
    }
}
