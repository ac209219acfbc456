use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Callback invoked once with the fully constructed native node.
pub type MountHook<N> = Box<dyn FnOnce(&N)>;

/// Attribute value of an element.
///
/// Strings are written verbatim; everything else is written as its JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    String(String),
    Json(serde_json::Value),
}

impl AttrValue {
    /// Text form written into the native attribute.
    pub fn to_attribute_text(&self) -> String {
        match self {
            AttrValue::String(value) => value.clone(),
            AttrValue::Json(value) => value.to_string(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<serde_json::Value> for AttrValue {
    fn from(value: serde_json::Value) -> Self {
        AttrValue::Json(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Json(value.into())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Json(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Json(value.into())
    }
}

/// One node of a declarative interface tree.
///
/// Children are rendered in order. The tree is consumed by materialization and
/// has no identity afterwards.
pub enum UiNode<N> {
    Element(ElementNode<N>),
    Text(String),
}

pub struct ElementNode<N> {
    pub tag: String,
    /// Unique keys, kept in insertion order.
    pub attributes: IndexMap<String, AttrValue>,
    pub children: Vec<UiNode<N>>,
    pub on_mount: Option<MountHook<N>>,
}

/// Starts an element description.
pub fn element<N>(tag: impl Into<String>) -> ElementNode<N> {
    ElementNode {
        tag: tag.into(),
        attributes: IndexMap::new(),
        children: Vec::new(),
        on_mount: None,
    }
}

pub fn text<N>(content: impl Into<String>) -> UiNode<N> {
    UiNode::Text(content.into())
}

impl<N> ElementNode<N> {
    /// Sets an attribute. Setting an existing key replaces the value in place.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: impl Into<UiNode<N>>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<C: Into<UiNode<N>>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn on_mount(mut self, hook: impl FnOnce(&N) + 'static) -> Self {
        self.on_mount = Some(Box::new(hook));
        self
    }
}

impl<N> UiNode<N> {
    /// Number of logical nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        match self {
            UiNode::Text(_) => 1,
            UiNode::Element(element) => {
                1 + element.children.iter().map(UiNode::node_count).sum::<usize>()
            }
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode<N>> {
        match self {
            UiNode::Element(element) => Some(element),
            UiNode::Text(_) => None,
        }
    }
}

impl<N> From<ElementNode<N>> for UiNode<N> {
    fn from(element: ElementNode<N>) -> Self {
        UiNode::Element(element)
    }
}

impl<N> From<&str> for UiNode<N> {
    fn from(content: &str) -> Self {
        UiNode::Text(content.to_string())
    }
}

impl<N> From<String> for UiNode<N> {
    fn from(content: String) -> Self {
        UiNode::Text(content)
    }
}

impl<N> fmt::Debug for UiNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiNode::Element(element) => element.fmt(f),
            UiNode::Text(content) => f.debug_tuple("Text").field(content).finish(),
        }
    }
}

impl<N> fmt::Debug for ElementNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes)
            .field("children", &self.children)
            .field("on_mount", &self.on_mount.is_some())
            .finish()
    }
}
