//! Owned XML element tree for structural body comparison.
//!
//! `sxd_document` packages are not `Sync`, so constraint documents are parsed
//! once at build time and converted into this plain tree.

use std::collections::BTreeMap;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Document, Element};
use sxd_document::parser;

/// Deepest element nesting accepted in a document.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Local name, prefixed with `{namespace}` when namespaced
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    /// Concatenated direct text content, trimmed
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<Self, String> {
        let package = parser::parse(xml).map_err(|e| format!("{e:?}"))?;
        let document = package.as_document();
        document
            .root()
            .children()
            .into_iter()
            .find_map(|child| match child {
                ChildOfRoot::Element(element) => Some(Self::from_element(element, 1)),
                _ => None,
            })
            .ok_or_else(|| "document has no root element".to_string())?
    }

    fn from_element(element: Element<'_>, depth: usize) -> Result<Self, String> {
        if depth > MAX_DEPTH {
            return Err(format!("elements nested deeper than {MAX_DEPTH} levels"));
        }

        let attributes = element
            .attributes()
            .into_iter()
            .map(|attr| {
                let name = attr.name();
                (
                    qualified(name.namespace_uri(), name.local_part()),
                    attr.value().to_string(),
                )
            })
            .collect();

        let mut text = String::new();
        let mut children = Vec::new();
        for child in element.children() {
            match child {
                ChildOfElement::Element(e) => children.push(Self::from_element(e, depth + 1)?),
                ChildOfElement::Text(t) => text.push_str(t.text()),
                _ => {}
            }
        }

        Ok(XmlElement {
            name: qualified(element.name().namespace_uri(), element.name().local_part()),
            attributes,
            text: text.trim().to_string(),
            children,
        })
    }
}

/// True when any element in the document is nested deeper than [`MAX_DEPTH`].
///
/// Walks the tree with an explicit stack, so it is safe on hostile input.
pub fn exceeds_max_depth(document: &Document<'_>) -> bool {
    let mut stack: Vec<(Element<'_>, usize)> = document
        .root()
        .children()
        .into_iter()
        .filter_map(|child| match child {
            ChildOfRoot::Element(e) => Some((e, 1)),
            _ => None,
        })
        .collect();

    while let Some((element, depth)) = stack.pop() {
        if depth > MAX_DEPTH {
            return true;
        }
        for child in element.children() {
            if let ChildOfElement::Element(e) = child {
                stack.push((e, depth + 1));
            }
        }
    }
    false
}

fn qualified(namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(ns) => format!("{{{ns}}}{local}"),
        None => local.to_string(),
    }
}
