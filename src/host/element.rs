//! Declarative element trees.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::error::SkeneResult;
use crate::host::props::Props;
use crate::scene::node::NodeKind;

/// One node of a declarative tree, as handed to the reconciler.
///
/// The JSON form of a host element is
/// `{"type": "skRrect", "key": "a", "props": {..}, "children": [..]}`; a bare string is a
/// raw text child. Text children are rejected at commit time; text belongs in a `text` prop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Element {
    /// Raw text child.
    Text(String),
    /// Host element.
    Host {
        /// Element tag (`skCanvas`, `skRrect`, ...).
        #[serde(rename = "type")]
        ty: String,
        /// Sibling-unique reconciliation key.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        /// Prop bag.
        #[serde(default)]
        props: Props,
        /// Children in paint order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Element>,
    },
}

impl Element {
    /// Host element of `kind` with no props or children.
    pub fn new(kind: NodeKind) -> Self {
        Self::tagged(kind.tag())
    }

    /// Host element with an arbitrary tag; unknown tags fail when instantiated.
    pub fn tagged(ty: impl Into<String>) -> Self {
        Self::Host {
            ty: ty.into(),
            key: None,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// Raw text child.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Set the reconciliation key.
    pub fn key(mut self, k: impl Into<String>) -> Self {
        if let Self::Host { key, .. } = &mut self {
            *key = Some(k.into());
        }
        self
    }

    /// Set one prop.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Self::Host { props, .. } = &mut self {
            props.insert(name.into(), value.into());
        }
        self
    }

    /// Append a child.
    pub fn child(mut self, child: Element) -> Self {
        if let Self::Host { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Append several children.
    pub fn children(mut self, more: impl IntoIterator<Item = Element>) -> Self {
        if let Self::Host { children, .. } = &mut self {
            children.extend(more);
        }
        self
    }

    /// Decode a tree from JSON: a single element or an array of root elements.
    pub fn parse_roots(json: &str) -> SkeneResult<Vec<Element>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Roots {
            Many(Vec<Element>),
            One(Element),
        }

        Ok(match serde_json::from_str::<Roots>(json)? {
            Roots::Many(v) => v,
            Roots::One(e) => vec![e],
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/element.rs"]
mod tests;
