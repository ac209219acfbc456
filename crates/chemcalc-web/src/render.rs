//! Materialization of [`UiNode`] trees into native nodes.

use std::rc::Rc;

use chemcalc_scene::{ElementNode, InvalidNodeError, UiNode};

use crate::platform::Surface;

/// Turns node descriptions into live nodes on a [`Surface`].
///
/// Each logical node yields exactly one native node. The renderer attaches
/// children and sets attributes; everything else is left to mount hooks.
pub struct Renderer<S: Surface> {
    surface: Rc<S>,
}

impl<S: Surface> Clone for Renderer<S> {
    fn clone(&self) -> Self {
        Self {
            surface: Rc::clone(&self.surface),
        }
    }
}

impl<S: Surface> Renderer<S> {
    pub fn new(surface: Rc<S>) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &Rc<S> {
        &self.surface
    }

    /// Builds the native subtree for `node`.
    ///
    /// Children are attached before attributes are set, and the mount hook
    /// runs last with the complete node. An invalid tag or attribute name
    /// aborts the whole subtree.
    pub fn materialize(&self, node: UiNode<S::Node>) -> Result<S::Node, InvalidNodeError> {
        match node {
            UiNode::Text(content) => Ok(self.surface.create_text(&content)),
            UiNode::Element(element) => self.materialize_element(element),
        }
    }

    fn materialize_element(
        &self,
        element: ElementNode<S::Node>,
    ) -> Result<S::Node, InvalidNodeError> {
        let ElementNode {
            tag,
            attributes,
            children,
            on_mount,
        } = element;

        let native = self.surface.create_element(&tag)?;
        for child in children {
            let child = self.materialize(child)?;
            self.surface.append_child(&native, &child);
        }
        for (name, value) in &attributes {
            self.surface
                .set_attribute(&native, name, &value.to_attribute_text())?;
        }
        if let Some(on_mount) = on_mount {
            on_mount(&native);
        }
        Ok(native)
    }

    /// Decodes a JSON node description and materializes it.
    pub fn materialize_json(&self, value: serde_json::Value) -> Result<S::Node, InvalidNodeError> {
        self.materialize(UiNode::from_json(value)?)
    }
}
