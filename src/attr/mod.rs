pub mod literals;
pub mod names;

use serde::{Deserialize, Serialize};

pub use self::literals::*;
pub use self::names::NameProvider;

/// Namespace-qualified XML name. `space` is empty for unqualified names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    pub space: String,
    pub local: String,
}

impl QName {
    pub fn new(space: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            local: local.into(),
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.space.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.space, self.local)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr {
    pub name: QName,
    pub value: String,
}

impl Attr {
    pub fn new(space: &str, local: &str, value: &str) -> Self {
        Self {
            name: QName::new(space, local),
            value: value.to_string(),
        }
    }
}

impl From<roxmltree::Attribute<'_, '_>> for Attr {
    fn from(attr: roxmltree::Attribute<'_, '_>) -> Self {
        Self::new(attr.namespace().unwrap_or(""), attr.name(), attr.value())
    }
}

/// First attribute whose local name matches, regardless of namespace.
pub fn find_attr<'a>(attrs: &'a [Attr], local: &str) -> Option<&'a Attr> {
    attrs.iter().find(|a| a.name.local == local)
}

pub fn find_attr_ns<'a>(attrs: &'a [Attr], space: &str, local: &str) -> Option<&'a Attr> {
    attrs
        .iter()
        .find(|a| a.name.local == local && a.name.space == space)
}

/// `find_attr` over a parsed source node; returns the attribute value.
pub fn find_node_attr<'a>(node: roxmltree::Node<'a, '_>, local: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == local)
        .map(|a| a.value())
}

/// Like `find_node_attr` but treats an all-whitespace value as absent.
pub fn find_node_attr_non_empty<'a>(node: roxmltree::Node<'a, '_>, local: &str) -> Option<&'a str> {
    find_node_attr(node, local).filter(|v| !v.trim().is_empty())
}
