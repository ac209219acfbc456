//! In-memory platform for tests and headless runs.
//!
//! `MemorySurface` keeps a plain node tree with just enough DOM behavior for
//! the forms: attributes, input values and submit handlers. `MemoryScheduler`
//! runs spawned futures only when asked to, which makes every interleaving of
//! loads and submissions reproducible.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use chemcalc_scene::{InvalidNodeError, validate_attribute_name, validate_tag_name};
use futures_executor::{LocalPool, LocalSpawner};
use futures_util::future::LocalBoxFuture;
use futures_util::task::LocalSpawnExt;
use indexmap::IndexMap;
use log::error;

use super::{Spawner, Surface, SubmitHandler};

// --- MemoryNode ---

/// Handle to a node of the in-memory tree. Clones share the node.
#[derive(Clone)]
pub struct MemoryNode(Rc<NodeData>);

struct NodeData {
    id: usize,
    kind: NodeKind,
}

enum NodeKind {
    Element(ElementData),
    Text(String),
}

struct ElementData {
    tag: String,
    attributes: RefCell<IndexMap<String, String>>,
    children: RefCell<Vec<MemoryNode>>,
    value: RefCell<String>,
    submit_handlers: RefCell<Vec<SubmitHandler>>,
}

impl MemoryNode {
    fn new_element(id: usize, tag: &str) -> Self {
        Self(Rc::new(NodeData {
            id,
            kind: NodeKind::Element(ElementData {
                tag: tag.to_string(),
                attributes: RefCell::new(IndexMap::new()),
                children: RefCell::new(Vec::new()),
                value: RefCell::new(String::new()),
                submit_handlers: RefCell::new(Vec::new()),
            }),
        }))
    }

    fn new_text(id: usize, content: &str) -> Self {
        Self(Rc::new(NodeData {
            id,
            kind: NodeKind::Text(content.to_string()),
        }))
    }

    fn element_data(&self) -> Option<&ElementData> {
        match &self.0.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    /// Creation order number, unique per surface.
    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn ptr_eq(&self, other: &MemoryNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn tag(&self) -> Option<&str> {
        self.element_data().map(|data| data.tag.as_str())
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.kind, NodeKind::Text(_))
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.element_data()?.attributes.borrow().get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Attribute pairs in the order they were first set.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.element_data()
            .map(|data| {
                data.attributes
                    .borrow()
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn children(&self) -> Vec<MemoryNode> {
        self.element_data()
            .map(|data| data.children.borrow().clone())
            .unwrap_or_default()
    }

    /// Concatenated text of this node and all its descendants.
    pub fn text_content(&self) -> String {
        match &self.0.kind {
            NodeKind::Text(content) => content.clone(),
            NodeKind::Element(data) => data
                .children
                .borrow()
                .iter()
                .map(MemoryNode::text_content)
                .collect(),
        }
    }

    /// This node followed by all descendants, depth first.
    pub fn descendants(&self) -> Vec<MemoryNode> {
        let mut nodes = vec![self.clone()];
        for child in self.children() {
            nodes.extend(child.descendants());
        }
        nodes
    }

    pub fn find_all(&self, predicate: impl Fn(&MemoryNode) -> bool) -> Vec<MemoryNode> {
        self.descendants()
            .into_iter()
            .filter(|node| predicate(node))
            .collect()
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<MemoryNode> {
        self.find_all(|node| node.tag() == Some(tag))
    }

    /// HTML serialization of the subtree. Input values are properties, not
    /// attributes, and are not part of it.
    pub fn outer_html(&self) -> String {
        let mut html = String::new();
        self.write_html(&mut html);
        html
    }

    fn write_html(&self, html: &mut String) {
        match &self.0.kind {
            NodeKind::Text(content) => html.push_str(&escape(content, false)),
            NodeKind::Element(data) => {
                html.push('<');
                html.push_str(&data.tag);
                for (name, value) in data.attributes.borrow().iter() {
                    html.push(' ');
                    html.push_str(name);
                    if !value.is_empty() {
                        html.push_str("=\"");
                        html.push_str(&escape(value, true));
                        html.push('"');
                    }
                }
                html.push('>');
                if is_void_element(&data.tag) {
                    return;
                }
                for child in data.children.borrow().iter() {
                    child.write_html(html);
                }
                html.push_str("</");
                html.push_str(&data.tag);
                html.push('>');
            }
        }
    }
}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryNode#{}({})", self.0.id, self.outer_html())
    }
}

fn escape(content: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn is_void_element(tag: &str) -> bool {
    matches!(tag, "input" | "br" | "hr" | "img" | "meta" | "link")
}

// --- MemorySurface ---

pub struct MemorySurface {
    body: MemoryNode,
    next_id: Cell<usize>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self {
            body: MemoryNode::new_element(0, "body"),
            next_id: Cell::new(1),
        }
    }

    fn allocate_id(&self) -> usize {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Number of nodes created through the surface, the body excluded.
    pub fn created_count(&self) -> usize {
        self.next_id.get() - 1
    }

    pub fn body_node(&self) -> MemoryNode {
        self.body.clone()
    }

    /// Activates a form the way a click on its submit control would.
    ///
    /// Returns whether the default navigation was suppressed, which is the
    /// case as soon as a submit handler is registered.
    pub fn submit(&self, form: &MemoryNode) -> bool {
        let handlers = match form.element_data() {
            Some(data) => data.submit_handlers.borrow().clone(),
            None => return false,
        };
        for handler in &handlers {
            handler();
        }
        !handlers.is_empty()
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for MemorySurface {
    type Node = MemoryNode;

    fn create_element(&self, tag: &str) -> Result<MemoryNode, InvalidNodeError> {
        validate_tag_name(tag)?;
        Ok(MemoryNode::new_element(self.allocate_id(), tag))
    }

    fn create_text(&self, content: &str) -> MemoryNode {
        MemoryNode::new_text(self.allocate_id(), content)
    }

    fn set_attribute(
        &self,
        node: &MemoryNode,
        name: &str,
        value: &str,
    ) -> Result<(), InvalidNodeError> {
        let Some(data) = node.element_data() else {
            error!("[MemorySurface] set_attribute `{name}` on a text node");
            return Ok(());
        };
        validate_attribute_name(&data.tag, name)?;
        data.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn append_child(&self, parent: &MemoryNode, child: &MemoryNode) {
        match parent.element_data() {
            Some(data) => data.children.borrow_mut().push(child.clone()),
            None => error!("[MemorySurface] append_child on a text node"),
        }
    }

    fn replace_child(&self, parent: &MemoryNode, new_child: &MemoryNode, old_child: &MemoryNode) {
        let Some(data) = parent.element_data() else {
            error!("[MemorySurface] replace_child on a text node");
            return;
        };
        let mut children = data.children.borrow_mut();
        match children.iter().position(|child| child.ptr_eq(old_child)) {
            Some(index) => children[index] = new_child.clone(),
            None => error!(
                "[MemorySurface] replace_child: node #{} is not a child of #{}",
                old_child.id(),
                parent.id()
            ),
        }
    }

    fn body(&self) -> Option<MemoryNode> {
        Some(self.body.clone())
    }

    fn input_value(&self, input: &MemoryNode) -> String {
        match input.element_data() {
            Some(data) if data.tag == "input" => data.value.borrow().clone(),
            _ => String::new(),
        }
    }

    fn set_input_value(&self, input: &MemoryNode, value: &str) {
        match input.element_data() {
            Some(data) if data.tag == "input" => *data.value.borrow_mut() = value.to_string(),
            _ => error!("[MemorySurface] set_input_value on a non-input node"),
        }
    }

    fn on_submit(&self, form: &MemoryNode, handler: SubmitHandler) {
        match form.element_data() {
            Some(data) => data.submit_handlers.borrow_mut().push(handler),
            None => error!("[MemorySurface] on_submit on a text node"),
        }
    }
}

// --- MemoryScheduler ---

/// Single-threaded executor that only makes progress inside
/// [`MemoryScheduler::run_until_stalled`].
pub struct MemoryScheduler {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl MemoryScheduler {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: RefCell::new(pool),
            spawner,
        }
    }

    /// Polls every spawned task until none of them can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }
}

impl Default for MemoryScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner for MemoryScheduler {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(spawn_error) = self.spawner.spawn_local(future) {
            error!("[MemoryScheduler] spawn failed: {spawn_error}");
        }
    }
}
